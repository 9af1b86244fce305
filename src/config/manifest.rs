//! Repository manifest (`dotstow.toml`).
//!
//! Every section is optional; anything left out falls back to the built-in
//! defaults (base tools, Fira Code, starship, oh-my-zsh with two plugins).
use std::path::Path;

use serde::Deserialize;

use super::toml_loader::load_config;
use crate::error::ConfigError;
use crate::resources::package::PackageManager;

/// File name of the manifest at the repository root.
pub const MANIFEST_FILE: &str = "dotstow.toml";

/// A system package, either a bare name or per-manager names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PackageSpec {
    /// Same name for every package manager.
    Name(String),
    /// Per-manager names plus optional probes.
    Table(PackageTable),
}

/// Table form of a [`PackageSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageTable {
    /// Name used for managers without an explicit entry.
    pub default: Option<String>,
    /// Name for `apt-get`.
    pub apt: Option<String>,
    /// Name for `dnf`.
    pub dnf: Option<String>,
    /// Name for `pacman`.
    pub pacman: Option<String>,
    /// Name for `zypper`.
    pub zypper: Option<String>,
    /// Name for `apk`.
    pub apk: Option<String>,
    /// Name for `brew`.
    pub brew: Option<String>,
    /// Executable whose presence on `PATH` means the tool is installed.
    pub bin: Option<String>,
    /// Font family whose presence in `fc-list` means the font is installed.
    pub family: Option<String>,
}

impl PackageSpec {
    /// Package name for `manager`, if the spec has one.
    #[must_use]
    pub fn name_for(&self, manager: PackageManager) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Table(t) => {
                let specific = match manager {
                    PackageManager::Apt => &t.apt,
                    PackageManager::Dnf => &t.dnf,
                    PackageManager::Pacman => &t.pacman,
                    PackageManager::Zypper => &t.zypper,
                    PackageManager::Apk => &t.apk,
                    PackageManager::Brew => &t.brew,
                };
                specific.as_deref().or(t.default.as_deref())
            }
        }
    }

    /// Executable probed on `PATH`.
    #[must_use]
    pub fn bin(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Table(t) => t.bin.as_deref(),
        }
    }

    /// Font family probed through `fc-list`.
    #[must_use]
    pub fn family(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Table(t) => t.family.as_deref(),
        }
    }
}

/// `[packages]`: the base list installed by `--pkg-install yes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesSection {
    /// Base packages.
    pub base: Vec<PackageSpec>,
}

impl Default for PackagesSection {
    fn default() -> Self {
        Self {
            base: ["git", "stow", "zsh", "curl"]
                .into_iter()
                .map(|n| PackageSpec::Name(n.to_string()))
                .collect(),
        }
    }
}

/// `[optional]`: font and prompt installed after the base list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionalSection {
    /// Font package.
    pub font: Option<PackageSpec>,
    /// Prompt utility.
    pub prompt: Option<PackageSpec>,
}

impl Default for OptionalSection {
    fn default() -> Self {
        let some = |s: &str| Some(s.to_string());
        Self {
            font: Some(PackageSpec::Table(PackageTable {
                apt: some("fonts-firacode"),
                dnf: some("fira-code-fonts"),
                pacman: some("ttf-fira-code"),
                zypper: some("fira-code-fonts"),
                apk: some("font-fira-code"),
                brew: some("font-fira-code"),
                family: some("Fira Code"),
                ..PackageTable::default()
            })),
            prompt: Some(PackageSpec::Table(PackageTable {
                default: some("starship"),
                bin: some("starship"),
                ..PackageTable::default()
            })),
        }
    }
}

/// A shell framework plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plugin {
    /// Directory name under `<framework>/custom/plugins/`.
    pub name: String,
    /// Clone URL.
    pub url: String,
}

/// `[shell]`: framework and plugin repositories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellSection {
    /// Framework clone URL.
    pub framework: String,
    /// Framework directory, relative to the target root.
    pub dir: String,
    /// Plugins cloned into the framework's custom plugin directory.
    pub plugins: Vec<Plugin>,
}

impl Default for ShellSection {
    fn default() -> Self {
        let plugin = |name: &str| Plugin {
            name: name.to_string(),
            url: format!("https://github.com/zsh-users/{name}.git"),
        };
        Self {
            framework: "https://github.com/ohmyzsh/ohmyzsh.git".to_string(),
            dir: ".oh-my-zsh".to_string(),
            plugins: vec![
                plugin("zsh-autosuggestions"),
                plugin("zsh-syntax-highlighting"),
            ],
        }
    }
}

/// `[scan]`: package discovery tweaks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    /// Top-level directories never treated as packages.
    pub ignore: Vec<String>,
}

/// Parsed `dotstow.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Base package list.
    pub packages: PackagesSection,
    /// Font and prompt.
    pub optional: OptionalSection,
    /// Shell framework.
    pub shell: ShellSection,
    /// Scanner settings.
    pub scan: ScanSection,
}

impl Manifest {
    /// Load the manifest of `repo`, or the defaults when it has none.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but is unreadable or invalid.
    pub fn load(repo: &Path) -> Result<Self, ConfigError> {
        load_config(&repo.join(MANIFEST_FILE))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Manifest {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), content).unwrap();
        Manifest::load(dir.path()).unwrap()
    }

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let m = Manifest::load(dir.path()).unwrap();
        let base: Vec<_> = m
            .packages
            .base
            .iter()
            .filter_map(|p| p.name_for(PackageManager::Apt))
            .collect();
        assert_eq!(base, vec!["git", "stow", "zsh", "curl"]);
        assert_eq!(m.shell.dir, ".oh-my-zsh");
        assert_eq!(m.shell.plugins.len(), 2);
        assert!(m.scan.ignore.is_empty());
    }

    #[test]
    fn default_font_names_per_manager() {
        let font = OptionalSection::default().font.unwrap();
        assert_eq!(font.name_for(PackageManager::Apt), Some("fonts-firacode"));
        assert_eq!(font.name_for(PackageManager::Pacman), Some("ttf-fira-code"));
        assert_eq!(font.family(), Some("Fira Code"));
        assert_eq!(font.bin(), None);
    }

    #[test]
    fn mixed_package_forms() {
        let m = parse(
            r#"
[packages]
base = ["git", { apt = "fd-find", default = "fd", bin = "fd" }]
"#,
        );
        assert_eq!(m.packages.base.len(), 2);
        let fd = &m.packages.base[1];
        assert_eq!(fd.name_for(PackageManager::Apt), Some("fd-find"));
        assert_eq!(fd.name_for(PackageManager::Brew), Some("fd"));
        assert_eq!(fd.bin(), Some("fd"));
    }

    #[test]
    fn table_without_match_or_default_has_no_name() {
        let spec = PackageSpec::Table(PackageTable {
            pacman: Some("ttf-fira-code".to_string()),
            ..PackageTable::default()
        });
        assert_eq!(spec.name_for(PackageManager::Dnf), None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let m = parse(
            r#"
[scan]
ignore = ["docs", "scripts"]

[shell]
plugins = []
"#,
        );
        assert_eq!(m.scan.ignore, vec!["docs", "scripts"]);
        assert!(m.shell.plugins.is_empty());
        assert_eq!(m.shell.framework, "https://github.com/ohmyzsh/ohmyzsh.git");
        assert_eq!(m.packages, PackagesSection::default());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[scan]\nexclude = []\n").unwrap();
        let err = Manifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
    }
}
