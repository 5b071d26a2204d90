//! npm package references: parsing, name normalisation, and download.
pub mod download;

pub use download::PackageCache;

use crate::error::ConfigError;
use crate::paths::NPM_PREFIX;

/// Prefix every configuration package name carries on the registry.
pub const PACKAGE_PREFIX: &str = "repo-starter-kit-";

/// A package reference split into its package name and an optional file path
/// inside the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Package name as written (`name` or `@scope/name`), `npm:` stripped.
    pub name: String,
    /// Path of a file inside the package, if one was given.
    pub file: Option<String>,
}

impl PackageSpec {
    /// Split `[npm:]<name>[/<file>]` or `[npm:]@scope/<name>[/<file>]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use repo_starter_kit::npm::PackageSpec;
    ///
    /// let spec = PackageSpec::parse("npm:@acme/kit/labels.yml");
    /// assert_eq!(spec.name, "@acme/kit");
    /// assert_eq!(spec.file.as_deref(), Some("labels.yml"));
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.strip_prefix(NPM_PREFIX).unwrap_or(value);

        let separator = value.strip_prefix('@').map_or_else(
            || value.find('/'),
            |scoped| {
                scoped
                    .split_once('/')
                    .and_then(|(scope, rest)| rest.find('/').map(|second| scope.len() + second + 2))
            },
        );

        match separator {
            Some(index) => {
                let (name, tail) = value.split_at(index);
                let file = tail.strip_prefix('/').unwrap_or(tail);
                Self {
                    name: name.to_string(),
                    file: (!file.is_empty()).then(|| file.to_string()),
                }
            }
            None => Self {
                name: value.to_string(),
                file: None,
            },
        }
    }

    /// The registry name of this package, see [`normalize_package_name`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPackage`] for empty or malformed names.
    pub fn normalized_name(&self) -> Result<String, ConfigError> {
        normalize_package_name(&self.name)
    }
}

/// Prefix the bare package name with `repo-starter-kit-` unless it already
/// carries it. Scoped names keep their scope.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPackage`] when the name is empty or a scoped
/// name lacks the part after `/`.
///
/// # Examples
///
/// ```
/// use repo_starter_kit::npm::normalize_package_name;
///
/// assert_eq!(normalize_package_name("demo").unwrap(), "repo-starter-kit-demo");
/// assert_eq!(
///     normalize_package_name("@acme/repo-starter-kit-demo").unwrap(),
///     "@acme/repo-starter-kit-demo"
/// );
/// ```
pub fn normalize_package_name(input: &str) -> Result<String, ConfigError> {
    if input.is_empty() {
        return Err(ConfigError::InvalidPackage(
            "Package name cannot be empty.".to_string(),
        ));
    }

    if input.starts_with('@') {
        let Some((scope, name)) = input.split_once('/') else {
            return Err(ConfigError::InvalidPackage(format!(
                "Scoped package '{input}' must include a name after '/'."
            )));
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidPackage(format!(
                "Scoped package '{input}' is missing the package name."
            )));
        }
        if name.starts_with(PACKAGE_PREFIX) {
            return Ok(format!("{scope}/{name}"));
        }
        return Ok(format!("{scope}/{PACKAGE_PREFIX}{name}"));
    }

    if input.starts_with(PACKAGE_PREFIX) {
        Ok(input.to_string())
    } else {
        Ok(format!("{PACKAGE_PREFIX}{input}"))
    }
}
