//! # Fechas HTTP
//! src/http/date.rs
//!
//! Formato único de fecha para todo el servidor: cabecera `Date`,
//! cabecera `Last-Modified`, la comparación del GET condicional y la
//! marca de recepción en los logs de transacciones.
//!
//! Usar un solo formateador no es casualidad: el GET condicional compara
//! el valor de `If-Modified-Since` contra la fecha de modificación del
//! fichero como cadenas, byte a byte. Un cliente que devuelve el
//! `Last-Modified` tal cual lo recibió obtiene su 304.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// Patrón de fecha legible, estilo `Sat Jan 04 12:30:45 UTC 2020`
const DATE_PATTERN: &str = "%a %b %d %H:%M:%S %Z %Y";

/// Formatea un instante cualquiera con el patrón del servidor
pub fn format_datetime(moment: DateTime<Utc>) -> String {
    moment.format(DATE_PATTERN).to_string()
}

/// Formatea un `SystemTime` (típicamente la fecha de modificación de un
/// fichero) con el patrón del servidor
///
/// # Ejemplo
/// ```
/// use std::time::UNIX_EPOCH;
/// use webserver::http::date::format_system_time;
///
/// assert_eq!(format_system_time(UNIX_EPOCH), "Thu Jan 01 00:00:00 UTC 1970");
/// ```
pub fn format_system_time(moment: SystemTime) -> String {
    format_datetime(DateTime::<Utc>::from(moment))
}

/// Fecha actual ya formateada, para la cabecera `Date`
pub fn now_string() -> String {
    format_datetime(Utc::now())
}
