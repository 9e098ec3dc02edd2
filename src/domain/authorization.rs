//! Compile-time allow-lists.
//!
//! The idTag list drives Authorize / StartTransaction / StopTransaction.
//! The vendor and model lists are only consulted when the boot allow-list
//! policy is switched on.

/// idTags accepted by Authorize and the transaction handlers.
pub const AUTHORIZED_ID_TAGS: [&str; 5] =
    ["12345", "D0431F35", "00FFFFFFFF", "idTag_Charger", "100"];

/// Charge point models recognised by the boot policy hook.
pub const KNOWN_CP_MODELS: [&str; 5] =
    ["MicroOcpp Simulator", "model2", "model3", "model4", "model5"];

/// Charge point vendors recognised by the boot policy hook.
pub const KNOWN_CP_VENDORS: [&str; 5] = ["MicroOcpp", "vendor2", "vendor3", "vendor4", "vendor5"];

/// When enabled, BootNotification answers `Rejected` (with the resend
/// interval) for vendor/model pairs outside the lists above.
pub const ENFORCE_BOOT_ALLOW_LIST: bool = false;

/// idTag comparison is case-insensitive throughout.
pub fn id_tag_authorized(id_tag: &str) -> bool {
    AUTHORIZED_ID_TAGS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(id_tag))
}

pub fn model_known(model: &str) -> bool {
    KNOWN_CP_MODELS.contains(&model)
}

pub fn vendor_known(vendor: &str) -> bool {
    KNOWN_CP_VENDORS.contains(&vendor)
}
