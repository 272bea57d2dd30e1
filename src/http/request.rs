//! # Parsing de Peticiones HTTP/1.0
//! src/http/request.rs
//!
//! Este módulo convierte el único buffer leído del socket en una petición
//! estructurada.
//!
//! ## Formato de una petición HTTP/1.0
//!
//! ```text
//! GET /ruta?var1=valor1&var2=valor2 HTTP/1.0\r\n
//! Host: localhost:5000\r\n
//! If-Modified-Since: Sat Jan 04 12:30:45 UTC 2020\r\n
//! \r\n
//! ```
//!
//! ## Reglas de parsing
//!
//! 1. Las líneas se separan con CRLF, CR suelto o LF suelto.
//! 2. La primera línea se trocea por espacios: método, target y versión.
//!    Con menos de 3 tokens la petición es inválida y no se sigue parseando.
//! 3. El resto de líneas se conserva tal cual llegó; las etapas posteriores
//!    buscan ahí la cabecera `If-Modified-Since` por subcadena.
//!
//! El target se guarda entero, query incluida: decidir si es fichero,
//! directorio o página dinámica es trabajo del resolutor, no del parser.

use regex::Regex;
use thiserror::Error;

/// Longitud de `"If-Modified-Since: "`, el prefijo que se descarta para
/// quedarse con el valor de la cabecera
const IF_MODIFIED_SINCE_PREFIX_LEN: usize = 19;

/// Métodos HTTP que distingue el servidor
///
/// Cualquier token desconocido se conserva en `Other` con su texto
/// original, para que los logs registren lo que el cliente envió de
/// verdad. Un método `Other` acaba en `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    Get,

    /// HEAD - Como GET pero la respuesta viaja sin cuerpo
    Head,

    /// Cualquier otro token en la posición del método
    Other(String),
}

impl Method {
    /// Clasifica el primer token de la línea de petición
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            _ => Method::Other(token.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Other(token) => token,
        }
    }
}

/// Representa una petición HTTP/1.0 parseada
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP (GET, HEAD u otro)
    method: Method,

    /// Target tal cual llegó, query incluida (ej: "/register.do?username=joe")
    target: String,

    /// Versión anunciada por el cliente (no se valida; la respuesta
    /// siempre es HTTP/1.0)
    version: String,

    /// Resto de líneas del buffer, sin tocar
    headers: Vec<String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// La línea de petición trae menos de 3 tokens
    ///
    /// Conserva los tokens que sí llegaron: el log de errores registra
    /// la petición aunque esté incompleta.
    #[error("línea de petición con {} tokens, se esperaban 3", .tokens.len())]
    RequestLine {
        /// Tokens observados en la primera línea (pueden ser 0, 1 o 2)
        tokens: Vec<String>,
    },
}

impl ParseError {
    /// Tokens de la línea de petición que llegaron a leerse
    pub fn tokens(&self) -> &[String] {
        match self {
            ParseError::RequestLine { tokens } => tokens,
        }
    }
}

impl Request {
    /// Parsea una petición HTTP/1.0 desde los bytes leídos del socket
    ///
    /// El buffer es el resultado de una única lectura acotada: si la
    /// petición no cupo entera, se parsea el trozo que llegó. Los bytes
    /// que no sean UTF-8 válido se decodifican con sustitución, nunca
    /// se rechaza la petición por eso.
    ///
    /// # Errores
    ///
    /// Retorna `ParseError::RequestLine` si la primera línea tiene menos
    /// de 3 tokens.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use webserver::http::{Method, Request};
    ///
    /// let raw = b"GET /index.html HTTP/1.0\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), &Method::Get);
    /// assert_eq!(request.target(), "/index.html");
    /// assert_eq!(request.version(), "HTTP/1.0");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let text = String::from_utf8_lossy(buffer);

        // CRLF, CR suelto o LF suelto separan líneas por igual
        let line_break = Regex::new(r"\r\n|\r|\n").expect("patrón de línea fijo");
        let lines: Vec<&str> = line_break.split(&text).collect();

        let first_line = lines.first().copied().unwrap_or("");
        let tokens: Vec<&str> = first_line.split_whitespace().collect();

        if tokens.len() < 3 {
            return Err(ParseError::RequestLine {
                tokens: tokens.iter().map(|t| t.to_string()).collect(),
            });
        }

        Ok(Request {
            method: Method::from_token(tokens[0]),
            target: tokens[1].to_string(),
            version: tokens[2].to_string(),
            headers: lines[1..].iter().map(|l| l.to_string()).collect(),
        })
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP de la petición
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Indica si la petición es un HEAD (la respuesta viaja sin cuerpo)
    pub fn is_head(&self) -> bool {
        self.method == Method::Head
    }

    /// Obtiene el target completo de la petición, query incluida
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene la versión HTTP anunciada por el cliente
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene las líneas de cabecera tal cual llegaron
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Busca la cabecera `If-Modified-Since` y devuelve su valor
    ///
    /// La búsqueda es por subcadena sobre las líneas crudas y el valor
    /// es todo lo que sigue al prefijo `"If-Modified-Since: "`. Una
    /// línea más corta que el prefijo produce el valor vacío.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use webserver::http::Request;
    ///
    /// let raw = b"GET /a.html HTTP/1.0\r\nIf-Modified-Since: Sat Jan 04 12:30:45 UTC 2020\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(
    ///     request.if_modified_since(),
    ///     Some("Sat Jan 04 12:30:45 UTC 2020")
    /// );
    /// ```
    pub fn if_modified_since(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|line| line.contains("If-Modified-Since"))
            .map(|line| line.get(IF_MODIFIED_SINCE_PREFIX_LEN..).unwrap_or(""))
    }

    /// Los tres tokens de la línea de petición, para el log de transacciones
    pub fn request_line_tokens(&self) -> Vec<String> {
        vec![
            self.method.as_str().to_string(),
            self.target.clone(),
            self.version.clone(),
        ]
    }
}
