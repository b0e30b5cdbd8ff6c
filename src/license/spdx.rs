use crate::models::LicenseRisk;

/// Risk level of a detected license type. Used for display only; the
/// allow-list alone decides whether a license is accepted.
pub fn risk_of(license_type: &str) -> LicenseRisk {
    match license_type.trim() {
        // Permissive
        "MIT"
        | "MIT-0"
        | "Apache-2.0"
        | "BSD-2-Clause"
        | "BSD-3-Clause"
        | "BSD-4-Clause"
        | "ISC"
        | "0BSD"
        | "Unlicense"
        | "Zlib"
        | "CC0-1.0"
        | "BSL-1.0"
        | "CC-BY-4.0"
        | "CC-BY-3.0" => LicenseRisk::Permissive,

        // Weak copyleft
        "LGPL-2.0"
        | "LGPL-2.1"
        | "LGPL-3.0"
        | "MPL-2.0"
        | "EPL-1.0"
        | "EPL-2.0"
        | "CDDL-1.0"
        | "EUPL-1.2" => LicenseRisk::WeakCopyleft,

        // Strong copyleft
        "GPL-2.0" | "GPL-3.0" | "AGPL-3.0" | "EUPL-1.1" => LicenseRisk::StrongCopyleft,

        "BUSL-1.1" | "SSPL-1.0" | "Elastic-2.0" => LicenseRisk::Proprietary,

        _ => LicenseRisk::Unknown,
    }
}
