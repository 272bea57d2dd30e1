//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.0
//! de forma programática y convertirlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Date: Sat Jan 04 12:30:45 UTC 2020\r\n
//! Server: linux\r\n
//! Content-Length: 13\r\n
//! Content-Type: text/html\r\n
//! Last-Modified: Sat Jan 04 12:00:00 UTC 2020\r\n
//! \r\n
//! <html>...</html>
//! ```
//!
//! Toda respuesta lleva `Date` y `Server`. Las cabeceras de contenido
//! solo aparecen cuando hay un recurso legible detrás: un 404, un 400 o
//! un 304 viajan como bloque de cabeceras pelado, sin cuerpo y sin
//! `Content-Length`.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use webserver::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/html")
//!     .with_body("<html></html>");
//!
//! let bytes = response.to_bytes();
//! // Ahora puedes enviar `bytes` por el socket
//! ```

use std::fs;
use std::path::Path;

use super::date;
use super::StatusCode;
use crate::resolver::Outcome;

/// Identificador de plataforma para la cabecera `Server`
const SERVER_ID: &str = std::env::consts::OS;

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 304, 400, 403, 404)
    status: StatusCode,

    /// Cabeceras en orden de emisión
    ///
    /// Se usa un Vec de pares y no un mapa: el orden en que se añaden
    /// es el orden en que se escriben en el socket.
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// Por defecto, la respuesta no tiene cabeceras ni cuerpo.
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok);
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Respuesta con el bloque de cabeceras mínimo: `Date` y `Server`
    ///
    /// Es el punto de partida de todas las respuestas del servidor y la
    /// respuesta completa de los códigos sin cuerpo (304, 400, 403, 404).
    pub fn bare(status: StatusCode) -> Self {
        Self::new(status)
            .with_header("Date", &date::now_string())
            .with_header("Server", SERVER_ID)
    }

    /// Agrega una cabecera a la respuesta
    ///
    /// Si la cabecera ya existe se sobrescribe su valor, conservando la
    /// posición original en el orden de emisión.
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "text/html");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega una cabecera a una respuesta existente (versión mutable)
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::{Response, StatusCode};
    ///
    /// let mut response = Response::new(StatusCode::Ok);
    /// response.add_header("Content-Type", "text/html");
    /// ```
    pub fn add_header(&mut self, name: &str, value: &str) {
        if let Some(pair) = self.headers.iter_mut().find(|(n, _)| n == name) {
            pair.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente calcula y agrega la cabecera `Content-Length`.
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body("Hello World");
    /// ```
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para servir ficheros tal cual, sin pasar por UTF-8.
    /// También ajusta `Content-Length` al tamaño real del cuerpo.
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.add_header("Content-Length", &self.body.len().to_string());
        self
    }

    /// Construye la respuesta a partir del resultado de la resolución
    ///
    /// Implementa la tabla de estados del servidor: fichero estático y
    /// listado de directorio dan 200, `NotModified` da 304 y el resto de
    /// variantes dan su 4xx correspondiente. Con `head` a true el cuerpo
    /// se omite siempre, pero el bloque de cabeceras es el mismo que
    /// tendría el GET equivalente.
    pub fn from_outcome(outcome: Outcome, head: bool) -> Self {
        match outcome {
            Outcome::StaticFile {
                path,
                len,
                modified,
            } => Self::static_file(&path, len, &modified, head),
            Outcome::Directory { entries } => Self::html_document(&listing_html(&entries), head),
            // Una página dinámica solo llega aquí si el dispatch falló
            Outcome::DynamicPage { .. } => Self::bare(StatusCode::NotFound),
            Outcome::NotModified => Self::bare(StatusCode::NotModified),
            Outcome::NotFound => Self::bare(StatusCode::NotFound),
            Outcome::Forbidden => Self::bare(StatusCode::Forbidden),
            Outcome::BadRequest => Self::bare(StatusCode::BadRequest),
        }
    }

    /// Respuesta 200 con un documento HTML generado por el servidor
    ///
    /// La usan los listados de directorio y las páginas dinámicas, que
    /// siempre viajan como `text/html` sin pasar por la detección de
    /// tipo MIME.
    pub fn html_document(body: &str, head: bool) -> Self {
        let response = Self::bare(StatusCode::Ok)
            .with_header("Content-Length", &body.len().to_string())
            .with_header("Content-Type", "text/html");
        if head {
            response
        } else {
            response.with_body(body)
        }
    }

    /// Respuesta 200 sobre un fichero del sistema
    ///
    /// `len` y `modified` vienen de los metadatos que leyó el resolutor.
    /// Si el fichero existe pero no se puede leer, la respuesta queda en
    /// el bloque mínimo: 200 sin cabeceras de contenido y sin cuerpo.
    fn static_file(path: &Path, len: u64, modified: &str, head: bool) -> Self {
        let response = Self::bare(StatusCode::Ok);
        if head {
            let readable = !path.is_dir() && fs::File::open(path).is_ok();
            if !readable {
                return response;
            }
            let mut response = response.with_header("Content-Length", &len.to_string());
            if let Some(mime) = content_type_for(path) {
                response.add_header("Content-Type", mime);
            }
            response.with_header("Last-Modified", modified)
        } else {
            match fs::read(path) {
                Ok(bytes) => {
                    let mut response =
                        response.with_header("Content-Length", &bytes.len().to_string());
                    if let Some(mime) = content_type_for(path) {
                        response.add_header("Content-Type", mime);
                    }
                    response
                        .with_header("Last-Modified", modified)
                        .with_body_bytes(bytes)
                }
                Err(_) => response,
            }
        }
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// Genera el formato completo HTTP/1.0:
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Cabeceras: `Nombre: valor\r\n` en orden de inserción
    /// - Línea vacía: `\r\n`
    /// - Cuerpo: bytes tal cual, sin framing adicional
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body("Hello");
    ///
    /// let bytes = response.to_bytes();
    /// // bytes contiene: "HTTP/1.0 200 OK\r\n...\r\n\r\nHello"
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();

        // 1. Status line
        let status_line = format!("HTTP/1.0 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        // 2. Cabeceras, en orden
        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        // 3. Línea vacía que separa cabeceras y cuerpo
        result.extend_from_slice(b"\r\n");

        // 4. Cuerpo (si existe)
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Busca una cabecera por nombre
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene las cabeceras en orden de emisión
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene una referencia al cuerpo
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Tamaño del recurso anunciado en `Content-Length`, o 0 si no hay
    ///
    /// El log de transacciones registra este valor para las respuestas
    /// exitosas; en un HEAD coincide con el tamaño del fichero aunque el
    /// cuerpo no viaje, y en un 304 es 0.
    pub fn content_length(&self) -> u64 {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// Tipo MIME deducido de la extensión del recurso, si se puede
fn content_type_for(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Documento HTML con el listado de un directorio
///
/// Una línea `<a href=NOMBRE> NOMBRE</a>` por cada hijo inmediato, en el
/// orden en que los enumeró el sistema de ficheros.
fn listing_html(entries: &[String]) -> String {
    let mut html =
        String::from("<!DOCTYPE html>\n<html>\n<body>\n\n<h1>Requested directory files</h1>\n\n<p>");
    for name in entries {
        html.push_str("<a href=");
        html.push_str(name);
        html.push_str("> ");
        html.push_str(name);
        html.push_str("</a>\n");
    }
    html.push_str("</p>\n\n</body>\n</html>\n");
    html
}
