//! Static starter files mounted into every lab sandbox.
//!
//! The bundle is compiled into the binary from the `templates/` directory and
//! mounted verbatim; nothing here interprets the contents.

macro_rules! template {
    ($path:literal) => {
        ($path, include_str!(concat!("../templates/", $path)))
    };
}

const LAB_FILES: &[(&str, &str)] = &[
    template!(".gitignore"),
    template!("Makefile"),
    template!("k8s/namespace.yaml"),
    template!("k8s/deployment.yaml"),
    template!("k8s/service.yaml"),
    template!("k8s/ingress.yaml"),
    template!("k8s/hpa.yaml"),
    template!(".github/workflows/deploy.yml"),
    template!("package.json"),
    template!("app.js"),
    template!("Dockerfile"),
    template!("docker-compose.yml"),
    template!("healthcheck.js"),
    template!("nginx.conf"),
    template!("init.sql"),
    template!(".env.example"),
    template!("README.md"),
];

/// Ordered mapping of sandbox-relative path to file contents.
#[derive(Debug, Clone, Copy)]
pub struct TemplateBundle {
    files: &'static [(&'static str, &'static str)],
}

impl TemplateBundle {
    /// The microservice deployment starter files.
    pub fn lab_files() -> Self {
        Self { files: LAB_FILES }
    }

    /// Builds a bundle over an arbitrary static file table.
    pub const fn from_static(files: &'static [(&'static str, &'static str)]) -> Self {
        Self { files }
    }

    /// Iterates `(path, contents)` pairs in mount order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.files.iter().copied()
    }

    /// Returns the contents of `path`, if bundled.
    pub fn get(&self, path: &str) -> Option<&'static str> {
        self.files
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, contents)| *contents)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for TemplateBundle {
    fn default() -> Self {
        Self::lab_files()
    }
}
