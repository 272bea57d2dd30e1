//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor web y su carga desde
//! el fichero de propiedades `server_properties.txt` del directorio de
//! trabajo.
//!
//! ## Formato del fichero
//!
//! ```text
//! PORT: 5000
//! DIRECTORY_INDEX: index.html
//! DIRECTORY: /srv/web
//! ALLOW: true
//! ```
//!
//! Cuatro líneas `CLAVE valor`; de cada línea se toma el segundo token,
//! así que la clave puede llevar `:` o no. Si el fichero falta o
//! cualquier línea no se puede interpretar, el servidor arranca entero
//! con los valores por defecto.
//!
//! La línea de comandos pide un puerto (`webserver <PUERTO>`) como
//! contrato de arranque, pero el puerto efectivo es el del fichero de
//! propiedades: si difieren se avisa por el log.

use std::fs;

use clap::Parser;

/// Nombre fijo del fichero de propiedades, relativo al directorio de trabajo
pub const PROPERTIES_FILE: &str = "server_properties.txt";

/// Argumentos de línea de comandos
///
/// Un único argumento posicional: el puerto. Arrancar con otro número de
/// argumentos, o con algo que no sea un puerto, termina el proceso con
/// diagnóstico y código distinto de cero.
#[derive(Debug, Clone, Parser)]
#[command(name = "webserver")]
#[command(about = "Servidor web HTTP/1.0 con páginas dinámicas y log de transacciones")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Puerto solicitado al arrancar (el fichero de propiedades tiene prioridad)
    pub port: u16,
}

/// Configuración del servidor web
///
/// Se construye una vez en el arranque y a partir de ahí es inmutable:
/// los workers la comparten en modo solo lectura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    pub port: u16,

    /// Fichero que se sirve cuando el target es un directorio
    pub directory_index: String,

    /// Directorio raíz del que cuelgan los recursos servidos
    pub root_directory: String,

    /// Si es false, los directorios no se listan ni se sirven índices
    pub allow_listing: bool,
}

impl Config {
    /// Carga la configuración desde `server_properties.txt`
    ///
    /// Cualquier defecto del fichero (ausente, corto, token que falta,
    /// puerto no numérico) deja la configuración entera en sus valores
    /// por defecto, avisando por el log para que el operador lo vea.
    pub fn load() -> Self {
        match fs::read_to_string(PROPERTIES_FILE) {
            Ok(contents) => match Self::parse_properties(&contents) {
                Some(config) => config,
                None => {
                    log::warn!(
                        "formato inválido en {}; se esperaba: PORT / DIRECTORY_INDEX / DIRECTORY / ALLOW",
                        PROPERTIES_FILE
                    );
                    log::warn!("usando la configuración por defecto");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("no se pudo leer {}: {}", PROPERTIES_FILE, e);
                log::warn!("usando la configuración por defecto");
                Self::default()
            }
        }
    }

    /// Interpreta el contenido del fichero de propiedades
    ///
    /// Cuatro líneas, de cada una el segundo token separado por espacio.
    /// `ALLOW` solo vale true con el literal exacto `true`.
    fn parse_properties(contents: &str) -> Option<Self> {
        let lines: Vec<&str> = contents.lines().collect();
        if lines.len() < 4 {
            return None;
        }

        let mut values = Vec::new();
        for line in &lines[..4] {
            values.push(line.split(' ').nth(1)?);
        }

        let port = values[0].parse().ok()?;

        Some(Config {
            port,
            directory_index: values[1].to_string(),
            root_directory: values[2].to_string(),
            allow_listing: values[3] == "true",
        })
    }

    /// Obtiene la dirección completa para bind
    ///
    /// El servidor escucha en todas las interfaces.
    ///
    /// # Ejemplo
    /// ```rust
    /// use webserver::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:5000");
    /// ```
    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               Servidor Web HTTP/1.0 - Configuración          ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Red:");
        println!("   Dirección:     {}", self.address());
        println!();
        println!("📁 Recursos:");
        println!("   Raíz:          {}", self.root_directory);
        println!("   Índice:        {}", self.directory_index);
        println!(
            "   Listado:       {}",
            if self.allow_listing {
                "permitido"
            } else {
                "deshabilitado"
            }
        );
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 5000,
            directory_index: "index.html".to_string(),
            root_directory: default_root(),
            allow_listing: false,
        }
    }
}

/// Directorio de trabajo actual, el raíz cuando no hay fichero de propiedades
fn default_root() -> String {
    std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| ".".to_string())
}
