use crate::settings::Settings;

/// Name of the section every engine settings file starts with.
const ROOT_SECTION: &str = "VueScan";

/// Builds the settings file handed to the scanning program.
///
/// Precedence, lowest first:
///
/// 1. an empty `[VueScan]` section, always present and always first,
/// 2. every section of `base` (the job's optional engine settings file),
/// 3. every job section named `{prefix}.{Name}`, copied into `[Name]`.
///
/// A key set by a later layer replaces the earlier value in place, so section
/// and key order follow first appearance. Neither input is modified.
pub fn merge_engine_sections(base: Option<&Settings>, job: &Settings, prefix: &str) -> Settings {
    let mut merged = Settings::new();
    merged.section_mut(ROOT_SECTION);
    for section in base.into_iter().flat_map(|settings| settings.sections()) {
        let target = merged.section_mut(section.name());
        for (key, value) in section.iter() {
            target.set(key, value);
        }
    }
    let scoped = format!("{prefix}.");
    for section in job.sections() {
        let Some(name) = section.name().strip_prefix(&scoped) else { continue };
        // `vuescan.a.b` lands in `[b]`.
        let name = name.rsplit('.').next().unwrap_or(name);
        let target = merged.section_mut(name);
        for (key, value) in section.iter() {
            target.set(key, value);
        }
    }
    merged
}
