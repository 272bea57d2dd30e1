//! # Resolución de Recursos
//! src/resolver.rs
//!
//! Dada una petición parseada y la configuración del servidor, este
//! módulo decide de qué tipo es la respuesta: fichero estático, listado
//! de directorio, página dinámica, 304, 404, 403 o 400. La decisión se
//! toma una sola vez por petición y se consume una sola vez.
//!
//! El orden de las comprobaciones importa y es parte del contrato:
//!
//! 1. Método desconocido
//! 2. Directorio (índice por defecto, listado o prohibido)
//! 3. Marcador de página dinámica en el target
//! 4. GET condicional (`If-Modified-Since`)
//! 5. Existencia del recurso
//! 6. Legibilidad cuando el listado está deshabilitado
//! 7. Fichero estático
//!
//! Cualquier error del sistema de ficheros degrada a `NotFound`: el
//! resolutor nunca tumba al worker.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::http::date;
use crate::http::{Method, Request};
use crate::pages;
use crate::pages::DYNAMIC_PAGE_MARKER;

/// Resultado de resolver una petición contra el sistema de ficheros
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Un fichero servible, con sus metadatos ya leídos
    StaticFile {
        /// Ruta absoluta del fichero a servir
        path: PathBuf,
        /// Tamaño en bytes según los metadatos
        len: u64,
        /// Fecha de modificación ya formateada para `Last-Modified`
        modified: String,
    },

    /// Un directorio listable: nombres de sus hijos inmediatos, en el
    /// orden en que los enumeró el sistema de ficheros
    Directory { entries: Vec<String> },

    /// Una página dinámica con su clave de handler y sus variables
    DynamicPage {
        /// Clave con la que se registró el handler
        key: String,
        /// Variables de la query, mas la clave centinela
        variables: HashMap<String, String>,
    },

    /// El recurso no cambió desde la fecha que indica el cliente
    NotModified,

    /// El recurso no existe (o no se pudo consultar)
    NotFound,

    /// Recurso ilegible o directorio con el listado deshabilitado
    Forbidden,

    /// Línea de petición malformada o método no soportado
    BadRequest,
}

/// Decide el tipo de respuesta para una petición
///
/// La ruta candidata es la concatenación cruda del directorio raíz y el
/// target: no se normaliza ni se sanea, de modo que un target con `..`
/// puede salirse de la raíz. Es una debilidad conocida del diseño que
/// queda documentada y sin corregir aquí.
pub fn resolve(request: &Request, config: &Config) -> Outcome {
    if let Method::Other(_) = request.method() {
        return Outcome::BadRequest;
    }

    let mut candidate = PathBuf::from(format!(
        "{}{}",
        config.root_directory,
        request.target()
    ));

    if candidate.is_dir() {
        if !config.allow_listing {
            return Outcome::Forbidden;
        }
        let index = candidate.join(&config.directory_index);
        if index.exists() {
            // Índice por defecto: se sigue resolviendo como fichero
            candidate = index;
        } else {
            return match directory_entries(&candidate) {
                Some(entries) => Outcome::Directory { entries },
                None => Outcome::NotFound,
            };
        }
    }

    if request.target().contains(DYNAMIC_PAGE_MARKER) {
        return match pages::parse_variables(request.target()) {
            Some((key, variables)) => Outcome::DynamicPage { key, variables },
            None => Outcome::NotFound,
        };
    }

    if let Some(since) = request.if_modified_since() {
        if let Ok(modified) = fs::metadata(&candidate).and_then(|m| m.modified()) {
            // Igualdad textual estricta, sin parsear fechas
            if since == date::format_system_time(modified) {
                return Outcome::NotModified;
            }
        }
    }

    let metadata = match fs::metadata(&candidate) {
        Ok(metadata) => metadata,
        Err(_) => return Outcome::NotFound,
    };

    if !config.allow_listing && (metadata.is_dir() || fs::File::open(&candidate).is_err()) {
        return Outcome::Forbidden;
    }

    let modified = match metadata.modified() {
        Ok(moment) => date::format_system_time(moment),
        Err(_) => return Outcome::NotFound,
    };

    Outcome::StaticFile {
        path: candidate,
        len: metadata.len(),
        modified,
    }
}

/// Nombres de los hijos inmediatos de un directorio
///
/// Devuelve `None` si el directorio no se puede enumerar entero; el
/// resolutor lo degrada a `NotFound`.
fn directory_entries(dir: &Path) -> Option<Vec<String>> {
    let reader = fs::read_dir(dir).ok()?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.ok()?;
        entries.push(entry.file_name().to_string_lossy().into_owned());
    }
    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn config_for(root: &TempDir, allow_listing: bool) -> Config {
        Config {
            port: 5000,
            directory_index: "index.html".to_string(),
            root_directory: root.path().display().to_string(),
            allow_listing,
        }
    }

    fn get(target: &str) -> Request {
        let raw = format!("GET {} HTTP/1.0\r\n\r\n", target);
        Request::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_static_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.txt"), b"contenido").unwrap();

        let outcome = resolve(&get("/a.txt"), &config_for(&root, false));

        match outcome {
            Outcome::StaticFile {
                path,
                len,
                modified,
            } => {
                assert!(path.ends_with("a.txt"));
                assert_eq!(len, 9);
                assert!(modified.contains(" UTC "));
            }
            other => panic!("se esperaba StaticFile: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let root = tempfile::tempdir().unwrap();

        let outcome = resolve(&get("/no-existe.txt"), &config_for(&root, true));

        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn test_unknown_method_is_bad_request() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.txt"), b"contenido").unwrap();

        let request = Request::parse(b"DELETE /a.txt HTTP/1.0\r\n\r\n").unwrap();
        let outcome = resolve(&request, &config_for(&root, true));

        assert_eq!(outcome, Outcome::BadRequest);
    }

    #[test]
    fn test_directory_without_listing_is_forbidden() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("docs")).unwrap();

        let outcome = resolve(&get("/docs"), &config_for(&root, false));

        assert_eq!(outcome, Outcome::Forbidden);
    }

    #[test]
    fn test_directory_with_index_resolves_to_index() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("docs")).unwrap();
        std::fs::write(root.path().join("docs/index.html"), b"<html></html>").unwrap();

        let outcome = resolve(&get("/docs"), &config_for(&root, true));

        match outcome {
            Outcome::StaticFile { path, len, .. } => {
                assert!(path.ends_with("docs/index.html"));
                assert_eq!(len, 13);
            }
            other => panic!("se esperaba el índice por defecto: {:?}", other),
        }
    }

    #[test]
    fn test_directory_with_trailing_slash() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("docs")).unwrap();
        std::fs::write(root.path().join("docs/index.html"), b"<html></html>").unwrap();

        let outcome = resolve(&get("/docs/"), &config_for(&root, true));

        assert!(matches!(outcome, Outcome::StaticFile { .. }));
    }

    #[test]
    fn test_directory_without_index_lists_children() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("docs")).unwrap();
        std::fs::write(root.path().join("docs/a.txt"), b"a").unwrap();
        std::fs::write(root.path().join("docs/b.txt"), b"b").unwrap();

        let outcome = resolve(&get("/docs"), &config_for(&root, true));

        match outcome {
            Outcome::Directory { mut entries } => {
                entries.sort();
                assert_eq!(entries, vec!["a.txt".to_string(), "b.txt".to_string()]);
            }
            other => panic!("se esperaba Directory: {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_page_target() {
        let root = tempfile::tempdir().unwrap();

        let outcome = resolve(
            &get("/register.do?username=joe"),
            &config_for(&root, false),
        );

        match outcome {
            Outcome::DynamicPage { key, variables } => {
                assert_eq!(key, pages::handler_key("register"));
                assert_eq!(variables.get("username").map(String::as_str), Some("joe"));
            }
            other => panic!("se esperaba DynamicPage: {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_page_without_query_fails_closed() {
        let root = tempfile::tempdir().unwrap();

        let outcome = resolve(&get("/register.do"), &config_for(&root, false));

        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn test_if_modified_since_exact_match() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("a.txt");
        std::fs::write(&path, b"contenido").unwrap();
        let modified =
            date::format_system_time(std::fs::metadata(&path).unwrap().modified().unwrap());

        let raw = format!(
            "GET /a.txt HTTP/1.0\r\nIf-Modified-Since: {}\r\n\r\n",
            modified
        );
        let request = Request::parse(raw.as_bytes()).unwrap();
        let outcome = resolve(&request, &config_for(&root, false));

        assert_eq!(outcome, Outcome::NotModified);
    }

    #[test]
    fn test_if_modified_since_mismatch_serves_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.txt"), b"contenido").unwrap();

        let raw = b"GET /a.txt HTTP/1.0\r\nIf-Modified-Since: Thu Jan 01 00:00:00 UTC 1970\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        let outcome = resolve(&request, &config_for(&root, false));

        assert!(matches!(outcome, Outcome::StaticFile { .. }));
    }

    #[test]
    fn test_path_traversal_is_not_sanitized() {
        // Debilidad documentada: un target con `..` sale de la raíz
        let outer = tempfile::tempdir().unwrap();
        std::fs::create_dir(outer.path().join("raiz")).unwrap();
        std::fs::write(outer.path().join("secreto.txt"), b"fuera").unwrap();

        let config = Config {
            port: 5000,
            directory_index: "index.html".to_string(),
            root_directory: outer.path().join("raiz").display().to_string(),
            allow_listing: false,
        };
        let outcome = resolve(&get("/../secreto.txt"), &config);

        match outcome {
            Outcome::StaticFile { len, .. } => assert_eq!(len, 5),
            other => panic!("se esperaba el fichero externo: {:?}", other),
        }
    }
}
