//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes
//! 3. Lee y parsea peticiones HTTP/1.0
//! 4. Resuelve el recurso, responde y registra la transacción
//!
//! Es concurrente al estilo clásico: un thread por conexión, sin pool.

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
