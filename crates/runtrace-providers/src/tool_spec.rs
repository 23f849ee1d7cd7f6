/// One vendor tool identifier and the canonical name it maps to
pub struct ToolSpec {
    pub vendor_name: &'static str,
    pub canonical: &'static str,
}

impl ToolSpec {
    pub const fn new(vendor_name: &'static str, canonical: &'static str) -> Self {
        Self {
            vendor_name,
            canonical,
        }
    }
}
