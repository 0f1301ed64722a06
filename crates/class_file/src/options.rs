use std::fmt;

/// Feature release of the runtime the class is being loaded into, e.g. `8`, `11` or `21`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JavaVersion(pub u16);

impl JavaVersion {
    pub const LATEST_SUPPORTED: JavaVersion = JavaVersion(21);

    /// Highest class file major version this release loads.
    pub fn class_file_version(self) -> u16 {
        self.0 + 44
    }

    pub fn java8_or_earlier(self) -> bool {
        self.0 <= 8
    }

    pub fn java11_or_earlier(self) -> bool {
        self.0 <= 11
    }

    pub fn java9_or_later(self) -> bool {
        self.0 >= 9
    }
}

impl Default for JavaVersion {
    fn default() -> Self {
        JavaVersion::LATEST_SUPPORTED
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings for a single parse. Everything the parser does not read from the class file
/// itself comes from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub java_version: JavaVersion,
    /// Accept `minor_version == 65535` at the highest supported major version.
    pub preview_enabled: bool,
    /// Validate names, descriptors, cross-entry references and local variable tables.
    pub validate: bool,
    /// Keep `StackMapTable` contents for a later verification pass.
    pub verifiable: bool,
    pub loader_is_boot_or_platform: bool,
    pub hidden: bool,
    pub force_allow_vm_annotations: bool,
    pub strict_java_compliance: bool,
    /// Internal name (`java/lang/Object`) the class is expected to have.
    pub requested_name: Option<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            java_version: JavaVersion::default(),
            preview_enabled: false,
            validate: true,
            verifiable: true,
            loader_is_boot_or_platform: false,
            hidden: false,
            force_allow_vm_annotations: false,
            strict_java_compliance: false,
            requested_name: None,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_java_version(mut self, java_version: JavaVersion) -> Self {
        self.java_version = java_version;
        self
    }

    pub fn with_preview_enabled(mut self, preview_enabled: bool) -> Self {
        self.preview_enabled = preview_enabled;
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_verifiable(mut self, verifiable: bool) -> Self {
        self.verifiable = verifiable;
        self
    }

    pub fn with_loader_is_boot_or_platform(mut self, loader_is_boot_or_platform: bool) -> Self {
        self.loader_is_boot_or_platform = loader_is_boot_or_platform;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_force_allow_vm_annotations(mut self, force_allow_vm_annotations: bool) -> Self {
        self.force_allow_vm_annotations = force_allow_vm_annotations;
        self
    }

    pub fn with_strict_java_compliance(mut self, strict_java_compliance: bool) -> Self {
        self.strict_java_compliance = strict_java_compliance;
        self
    }

    pub fn with_requested_name(mut self, requested_name: impl Into<String>) -> Self {
        self.requested_name = Some(requested_name.into());
        self
    }

    pub(crate) fn scan_vm_annotations(&self) -> bool {
        self.loader_is_boot_or_platform || self.force_allow_vm_annotations
    }
}

#[cfg(test)]
mod java_version_tests {
    use super::*;

    #[test]
    fn it_should_map_releases_to_class_file_versions() {
        assert_eq!(52, JavaVersion(8).class_file_version());
        assert_eq!(65, JavaVersion(21).class_file_version());
    }

    #[test]
    fn it_should_classify_release_ranges() {
        assert!(JavaVersion(8).java8_or_earlier());
        assert!(!JavaVersion(8).java9_or_later());
        assert!(JavaVersion(11).java11_or_earlier());
        assert!(!JavaVersion(12).java11_or_earlier());
    }

    #[test]
    fn it_should_default_to_validating_parses() {
        let options = ParserOptions::default();

        assert!(options.validate);
        assert!(options.verifiable);
        assert!(!options.scan_vm_annotations());
        assert!(ParserOptions::new()
            .with_force_allow_vm_annotations(true)
            .scan_vm_annotations());
    }
}
