//! Classification of import references.
//!
//! Resolution consults only the artefact and its [`CheckContext`]; the
//! filesystem is touched solely for local-file lookups below the project
//! root or the artefact's own directory, and not at all when local lookups
//! are disabled.

use crate::extract::ImportReference;
use crate::stdlib::is_stdlib;
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use vetting_common::{CheckContext, SourceArtifact};

/// How an import reference was classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Part of the Python standard library.
    Stdlib,
    /// Declared available by the caller.
    Declared,
    /// Found as a file or package on disk.
    Local(Utf8PathBuf),
    /// Not a submodule of the package, whose `__init__.py` may still
    /// define the name.
    PossiblyDefined(Utf8PathBuf),
    /// Not found anywhere.
    Unresolved,
    /// A relative import that cannot be decided; the reason completes
    /// "cannot be resolved ...".
    Undecidable(&'static str),
}

/// Resolves references for one artefact.
#[derive(Debug)]
pub struct Resolver<'a> {
    context: &'a CheckContext,
    artefact_dir: Option<Utf8PathBuf>,
    search_local: bool,
}

impl<'a> Resolver<'a> {
    /// Prepares a resolver for `artifact` in `context`.
    #[must_use]
    pub fn new(artifact: &SourceArtifact, context: &'a CheckContext, search_local: bool) -> Self {
        let artefact_dir = artifact.path().and_then(|path| {
            let absolute = match context.project_root() {
                Some(root) if path.is_relative() => root.join(path),
                _ => path.to_owned(),
            };
            absolute.parent().map(Utf8Path::to_owned)
        });
        Self {
            context,
            artefact_dir,
            search_local,
        }
    }

    /// Classifies one reference.
    #[must_use]
    pub fn resolve(&self, reference: &ImportReference) -> Resolution {
        let resolution = if reference.level > 0 {
            self.resolve_relative(reference)
        } else {
            self.resolve_absolute(reference)
        };
        trace!(
            target: crate::CHECKER_NAME,
            "`{}` resolved as {resolution:?}",
            reference.display_name()
        );
        resolution
    }

    fn resolve_absolute(&self, reference: &ImportReference) -> Resolution {
        if is_stdlib(reference.top_level()) {
            return Resolution::Stdlib;
        }
        if dotted_prefixes(&reference.module).any(|prefix| self.context.is_available(prefix)) {
            return Resolution::Declared;
        }
        if self.search_local {
            let top_level = reference.top_level();
            if let Some(found) = self
                .search_roots()
                .find_map(|root| find_module(root, &[top_level]))
            {
                return Resolution::Local(found);
            }
        }
        Resolution::Unresolved
    }

    fn resolve_relative(&self, reference: &ImportReference) -> Resolution {
        if !self.search_local {
            return Resolution::Undecidable("with local file resolution disabled");
        }
        let Some(dir) = self.artefact_dir.as_deref() else {
            return Resolution::Undecidable("without an artefact path");
        };
        let Some(base) = ancestor(dir, reference.level - 1) else {
            return Resolution::Unresolved;
        };

        let segments: Vec<&str> = reference
            .module
            .split('.')
            .filter(|segment| !segment.is_empty())
            .chain(reference.imported.as_deref())
            .collect();
        if let Some(found) = find_module(base, &segments) {
            return Resolution::Local(found);
        }

        let init = base.join("__init__.py");
        if reference.imported.is_some() && init.is_file() {
            Resolution::PossiblyDefined(init)
        } else {
            Resolution::Unresolved
        }
    }

    fn search_roots(&self) -> impl Iterator<Item = &Utf8Path> {
        let root = self.context.project_root();
        let own_dir = self
            .artefact_dir
            .as_deref()
            .filter(|dir| Some(*dir) != root);
        root.into_iter().chain(own_dir)
    }
}

/// Yields `a`, `a.b`, `a.b.c` for `a.b.c`.
fn dotted_prefixes(module: &str) -> impl Iterator<Item = &str> {
    module
        .match_indices('.')
        .map(|(index, _)| &module[..index])
        .chain(std::iter::once(module))
}

fn ancestor(dir: &Utf8Path, levels: usize) -> Option<&Utf8Path> {
    let mut current = dir;
    for _ in 0..levels {
        current = current.parent()?;
    }
    Some(current)
}

/// Looks for `segments` as a module file, a regular package, or a
/// namespace package below `base`.
fn find_module(base: &Utf8Path, segments: &[&str]) -> Option<Utf8PathBuf> {
    let (last, parents) = segments.split_last()?;
    let mut dir = base.to_owned();
    for segment in parents {
        dir.push(segment);
    }

    let file = dir.join(format!("{last}.py"));
    if file.is_file() {
        return Some(file);
    }
    let package = dir.join(last);
    package.is_dir().then_some(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn reference(module: &str, level: usize) -> ImportReference {
        ImportReference {
            module: module.to_owned(),
            level,
            imported: None,
            location: vetting_common::SourceLocation::new(1, 1),
            guarded: false,
        }
    }

    fn from_package(name: &str, level: usize) -> ImportReference {
        ImportReference {
            imported: Some(name.to_owned()),
            ..reference("", level)
        }
    }

    fn project() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        fs::create_dir_all(root.join("app/core")).expect("create package dirs");
        fs::write(root.join("app/__init__.py"), "").expect("write init");
        fs::write(root.join("app/core/models.py"), "").expect("write models");
        fs::write(root.join("settings.py"), "").expect("write settings");
        (dir, root)
    }

    #[rstest]
    fn dotted_prefixes_walk_outwards() {
        let prefixes: Vec<_> = dotted_prefixes("a.b.c").collect();

        assert_eq!(prefixes, ["a", "a.b", "a.b.c"]);
    }

    #[rstest]
    fn stdlib_wins_over_declared() {
        let context = CheckContext::new().with_available_modules(["os"]);
        let artefact = SourceArtifact::python("");
        let resolver = Resolver::new(&artefact, &context, true);

        assert_eq!(resolver.resolve(&reference("os.path", 0)), Resolution::Stdlib);
    }

    #[rstest]
    #[case("google.cloud.storage", Resolution::Declared)]
    #[case("google.auth", Resolution::Unresolved)]
    fn declared_dotted_names_cover_submodules(#[case] module: &str, #[case] expected: Resolution) {
        let context = CheckContext::new().with_available_modules(["google.cloud"]);
        let artefact = SourceArtifact::python("");
        let resolver = Resolver::new(&artefact, &context, false);

        assert_eq!(resolver.resolve(&reference(module, 0)), expected);
    }

    #[rstest]
    fn finds_local_modules_below_the_project_root() {
        let (_guard, root) = project();
        let context = CheckContext::new().with_project_root(root.clone());
        let artefact = SourceArtifact::python("").with_path("main.py");
        let resolver = Resolver::new(&artefact, &context, true);

        assert_eq!(
            resolver.resolve(&reference("settings", 0)),
            Resolution::Local(root.join("settings.py"))
        );
        assert_eq!(
            resolver.resolve(&reference("app.core.models", 0)),
            Resolution::Local(root.join("app"))
        );
        assert_eq!(resolver.resolve(&reference("missing", 0)), Resolution::Unresolved);
    }

    #[rstest]
    fn local_search_can_be_disabled() {
        let (_guard, root) = project();
        let context = CheckContext::new().with_project_root(root);
        let artefact = SourceArtifact::python("");
        let resolver = Resolver::new(&artefact, &context, false);

        assert_eq!(resolver.resolve(&reference("settings", 0)), Resolution::Unresolved);
    }

    #[rstest]
    fn relative_imports_resolve_from_the_artefact_directory() {
        let (_guard, root) = project();
        let context = CheckContext::new().with_project_root(root.clone());
        let artefact = SourceArtifact::python("").with_path("app/core/views.py");
        let resolver = Resolver::new(&artefact, &context, true);

        assert_eq!(
            resolver.resolve(&reference("models", 1)),
            Resolution::Local(root.join("app/core/models.py"))
        );
        assert_eq!(
            resolver.resolve(&reference("core.models", 2)),
            Resolution::Local(root.join("app/core/models.py"))
        );
        assert_eq!(resolver.resolve(&reference("forms", 1)), Resolution::Unresolved);
    }

    #[rstest]
    fn names_imported_from_a_package_resolve_as_submodules() {
        let (_guard, root) = project();
        let context = CheckContext::new().with_project_root(root.clone());
        let artefact = SourceArtifact::python("").with_path("app/core/views.py");
        let resolver = Resolver::new(&artefact, &context, true);

        assert_eq!(
            resolver.resolve(&from_package("core", 2)),
            Resolution::Local(root.join("app/core"))
        );
        assert_eq!(
            resolver.resolve(&from_package("models", 1)),
            Resolution::Local(root.join("app/core/models.py"))
        );
    }

    #[rstest]
    fn missing_names_defer_to_an_existing_package_init() {
        let (_guard, root) = project();
        let context = CheckContext::new().with_project_root(root.clone());
        let artefact = SourceArtifact::python("").with_path("app/core/views.py");
        let resolver = Resolver::new(&artefact, &context, true);

        assert_eq!(
            resolver.resolve(&from_package("VERSION", 2)),
            Resolution::PossiblyDefined(root.join("app/__init__.py"))
        );
        assert_eq!(resolver.resolve(&from_package("forms", 1)), Resolution::Unresolved);
    }

    #[rstest]
    fn relative_imports_without_a_path_are_undecidable() {
        let context = CheckContext::new();
        let artefact = SourceArtifact::python("");
        let resolver = Resolver::new(&artefact, &context, true);

        assert_eq!(
            resolver.resolve(&reference("models", 1)),
            Resolution::Undecidable("without an artefact path")
        );
    }

    #[rstest]
    fn relative_imports_are_undecidable_when_local_search_is_off() {
        let (_guard, root) = project();
        let context = CheckContext::new().with_project_root(root);
        let artefact = SourceArtifact::python("").with_path("app/core/views.py");
        let resolver = Resolver::new(&artefact, &context, false);

        assert_eq!(
            resolver.resolve(&reference("models", 1)),
            Resolution::Undecidable("with local file resolution disabled")
        );
    }
}
