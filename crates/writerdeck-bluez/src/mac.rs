//! Device MAC extraction from BlueZ object paths.

/// `/org/bluez/hci0/dev_aa_bb_cc_dd_ee_ff` to `AA:BB:CC:DD:EE:FF`.
///
/// The path must end in `dev_` followed by hex digits and underscores.
pub fn extract_mac(device_path: &str) -> Option<String> {
    device_path
        .match_indices("dev_")
        .map(|(i, _)| &device_path[i + 4..])
        .find(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit() || c == '_'))
        .map(|rest| rest.replace('_', ":").to_uppercase())
}
