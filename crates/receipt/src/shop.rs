use jobsheet_core::ShopTimezone;

/// Shop identity printed in every receipt header.
///
/// Passed into the renderer so one process can print for any shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub timezone: ShopTimezone,
}

impl ShopProfile {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
        timezone: ShopTimezone,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
            timezone,
        }
    }
}
