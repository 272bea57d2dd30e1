//! # Web Server
//! src/lib.rs
//!
//! Servidor web HTTP/1.0 concurrente implementado desde cero: sirve
//! ficheros estáticos, listados de directorio y páginas dinámicas, con
//! GET condicional y log persistente de transacciones.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `config`: Fichero de propiedades y argumentos de arranque
//! - `http`: Parsing de peticiones y generación de respuestas HTTP/1.0
//! - `resolver`: Traducción de target a recurso del sistema de ficheros
//! - `pages`: Registro y despacho de páginas dinámicas (`.do`)
//! - `logging`: Log de transacciones en `access_log.txt` y `errors_log.txt`
//! - `server`: Lógica del servidor TCP y manejo de conexiones
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use webserver::config::Config;
//! use webserver::pages::{PageRegistry, RegistrationPage};
//! use webserver::server::Server;
//!
//! let config = Config::default();
//!
//! let mut pages = PageRegistry::new();
//! pages.register("register", Box::new(RegistrationPage));
//!
//! let server = Server::bind(config, pages).expect("Error al iniciar servidor");
//! server.run().expect("Error en el servidor");
//! ```

pub mod config;
pub mod http;
pub mod logging;
pub mod pages;
pub mod resolver;
pub mod server;
