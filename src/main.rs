//! # Web Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor web HTTP/1.0.
//!
//! El arranque exige un puerto por línea de comandos, pero la
//! configuración efectiva sale de `server_properties.txt`; si no hay
//! fichero o está mal formado se usan los valores por defecto.

use clap::Parser;

use webserver::config::{Args, Config};
use webserver::pages::{PageRegistry, RegistrationPage};
use webserver::server::Server;

fn main() {
    println!("=================================");
    println!("  Web Server HTTP/1.0");
    println!("=================================\n");

    env_logger::init();

    // El argumento valida el arranque; el puerto efectivo es el del fichero
    let args = Args::parse();
    let config = Config::load();

    if args.port != config.port {
        log::warn!(
            "el puerto pedido ({}) difiere del configurado ({}); manda el fichero de propiedades",
            args.port,
            config.port
        );
    }

    config.print_summary();

    // Páginas dinámicas disponibles
    let mut pages = PageRegistry::new();
    pages.register("register", Box::new(RegistrationPage));

    let server = match Server::bind(config, pages) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("💥 Error fatal: {}", e);
            std::process::exit(1);
        }
    };

    // Iniciar el servidor (esto bloqueará el thread)
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
