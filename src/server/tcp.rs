//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que atiende múltiples conexiones
//! simultáneas usando threads. Cada conexión se procesa en su propio
//! thread: una lectura, una respuesta y cierre, al estilo HTTP/1.0.
//!
//! El ciclo de vida completo está acotado por dos temporizadores de 300
//! segundos: uno de lectura por conexión y otro de inactividad del
//! accept. Si nadie conecta en 300 segundos el servidor termina
//! ordenadamente.

use crate::config::Config;
use crate::http::{Request, Response, StatusCode};
use crate::logging::TransactionLog;
use crate::pages::PageRegistry;
use crate::resolver::{self, Outcome};
use chrono::Utc;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Tamaño máximo de petición que se lee del socket
///
/// Una única lectura; lo que no quepa aquí no se interpreta.
const MAX_REQUEST_BYTES: usize = 1024;

/// Tiempo máximo de espera por los datos de una conexión aceptada
const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Tiempo máximo sin aceptar conexiones antes de apagar el servidor
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Intervalo de sondeo del accept no bloqueante
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Servidor HTTP/1.0 concurrente con log de transacciones
pub struct Server {
    config: Arc<Config>,
    pages: Arc<PageRegistry>,
    log: TransactionLog,
    listener: TcpListener,
}

impl Server {
    /// Reserva el puerto y deja el servidor listo para `run`
    ///
    /// El log de transacciones se crea bajo el directorio raíz
    /// configurado. Con puerto 0 el sistema asigna uno efímero, que se
    /// puede consultar con [`Server::local_addr`].
    pub fn bind(config: Config, pages: PageRegistry) -> io::Result<Self> {
        let log = TransactionLog::new(&config.root_directory);
        let listener = TcpListener::bind(config.address())?;

        Ok(Self {
            config: Arc::new(config),
            pages: Arc::new(pages),
            log,
            listener,
        })
    }

    /// Dirección real en la que quedó escuchando el servidor
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Bucle principal: acepta conexiones hasta agotar la inactividad
    ///
    /// Cada conexión aceptada se despacha a su propio thread. El accept
    /// se sondea en modo no bloqueante para poder medir la inactividad;
    /// tras 300 segundos sin conexiones el bucle retorna `Ok(())`.
    pub fn run(&self) -> io::Result<()> {
        println!("[+] Servidor escuchando en {}", self.local_addr()?);
        println!("[*] Modo concurrente: un thread por conexion\n");

        self.listener.set_nonblocking(true)?;
        let mut last_accept = Instant::now();

        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    last_accept = Instant::now();

                    let config = Arc::clone(&self.config);
                    let pages = Arc::clone(&self.pages);
                    let log = self.log.clone();

                    let peer_addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());

                    println!(" ✅ Nueva conexión desde: {} (spawning thread)", peer_addr);

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, config, pages, log) {
                            eprintln!("   ❌ Error en thread: {}", e);
                        }
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if last_accept.elapsed() >= IDLE_TIMEOUT {
                        println!(
                            "[*] Nada recibido en {} segundos, apagando el servidor",
                            IDLE_TIMEOUT.as_secs()
                        );
                        return Ok(());
                    }
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Atiende una conexión completa: lee, resuelve, responde y registra
    ///
    /// La petición se lee de un tirón en un buffer de 1024 bytes; si el
    /// cliente mandó más, el resto se ignora y la petición se interpreta
    /// truncada. Un cliente que conecta y cierra sin enviar nada no deja
    /// rastro en el log de transacciones.
    fn handle_connection(
        mut stream: TcpStream,
        config: Arc<Config>,
        pages: Arc<PageRegistry>,
        log: TransactionLog,
    ) -> io::Result<()> {
        // El socket aceptado puede heredar el modo no bloqueante del listener
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let peer_addr = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let mut buffer = [0u8; MAX_REQUEST_BYTES];
        let bytes_read = match stream.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                println!(
                    "   ⏱ Nada recibido de {} en {} segundos, cerrando",
                    peer_addr,
                    READ_TIMEOUT.as_secs()
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if bytes_read == 0 {
            println!("   ✅ Conexión de {} cerrada sin datos", peer_addr);
            return Ok(());
        }

        let received_at = Utc::now();

        let (tokens, response) = match Request::parse(&buffer[..bytes_read]) {
            Ok(request) => {
                let tokens = request.request_line_tokens();
                let response = match resolver::resolve(&request, &config) {
                    Outcome::DynamicPage { variables, .. } => match pages.dispatch(&variables) {
                        Some(body) => Response::html_document(&body, request.is_head()),
                        None => Response::bare(StatusCode::NotFound),
                    },
                    outcome => Response::from_outcome(outcome, request.is_head()),
                };
                (tokens, response)
            }
            Err(e) => (
                e.tokens().to_vec(),
                Response::from_outcome(Outcome::BadRequest, false),
            ),
        };

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        log.record(
            &tokens,
            &peer_addr,
            received_at,
            response.status(),
            response.content_length(),
        );

        println!("   ✅ {} -> {}\n", peer_addr, response.status());

        Ok(())
    }
}
