use chrono::NaiveDate;
use scylla::value::CqlDate;

use crate::store_client::StoreError;

/// Converts a domain date into the driver's date representation.
/// Every date chrono can represent fits into `CqlDate`.
pub fn to_store(date: Option<NaiveDate>) -> Option<CqlDate> {
    date.map(CqlDate::from)
}

/// Converts the driver's date representation back into a domain date.
/// Fails for stored dates outside of the range chrono supports.
pub fn to_domain(date: Option<CqlDate>) -> Result<Option<NaiveDate>, StoreError> {
    date.map(|date| {
        TryInto::<NaiveDate>::try_into(date).map_err(|_| StoreError::DateOutOfRange(date.0))
    })
    .transpose()
}
