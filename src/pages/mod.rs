//! # Páginas Dinámicas
//! src/pages/mod.rs
//!
//! Este módulo implementa el mecanismo de páginas dinámicas: targets
//! con el sufijo `.do` que no se sirven desde disco sino que se generan
//! invocando un handler registrado.
//!
//! ## Arquitectura
//!
//! ```text
//! /register.do?username=joe → parse_variables → PageRegistry → handle(vars) → HTML
//! ```
//!
//! El registro es una tabla explícita construida en el arranque: cada
//! página se da de alta con `register` bajo su nombre de recurso y el
//! dispatcher la busca por la clave que viaja dentro del propio mapa de
//! variables. Añadir páginas nuevas es implementar el trait
//! [`DynamicPage`] y registrarlas; el dispatcher no se toca.

pub mod registration;

pub use registration::RegistrationPage;

use std::collections::HashMap;

/// Sufijo que marca un target como página dinámica
pub const DYNAMIC_PAGE_MARKER: &str = ".do";

/// Prefijo de espacio de nombres de las claves de handler
pub const KEY_PREFIX: &str = "pages.";

/// Clave centinela que transporta la clave del handler dentro del mapa
/// de variables
///
/// El prefijo `0x0` no puede aparecer como nombre de campo de un
/// formulario razonable, así que no colisiona con las variables reales.
pub const SENTINEL_KEY: &str = "0x0page";

/// Construye la clave de registro de una página a partir de su nombre
///
/// # Ejemplo
/// ```
/// use webserver::pages::handler_key;
/// assert_eq!(handler_key("register"), "pages.register");
/// ```
pub fn handler_key(name: &str) -> String {
    format!("{}{}", KEY_PREFIX, name)
}

/// Capacidad que implementa toda página dinámica
///
/// Recibe las variables de la query (mas la clave centinela) y devuelve
/// el cuerpo HTML de la respuesta. Devolver `None` significa que la
/// página no pudo generar salida; el dispatcher lo convierte en un
/// cuerpo vacío.
pub trait DynamicPage: Send + Sync {
    /// Genera el cuerpo HTML para las variables recibidas
    fn handle(&self, variables: &HashMap<String, String>) -> Option<String>;
}

/// Tabla de páginas dinámicas registradas
///
/// Se construye una vez en el arranque y después solo se consulta, así
/// que se comparte entre workers sin bloqueo alguno.
pub struct PageRegistry {
    /// Pares clave de handler → página
    pages: Vec<(String, Box<dyn DynamicPage>)>,
}

impl PageRegistry {
    /// Crea un registro vacío
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Da de alta una página bajo su nombre de recurso
    ///
    /// El nombre es el segmento del target antes de `.do`, sin la barra
    /// inicial: la página que atiende `/register.do` se registra como
    /// `register`.
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::pages::{PageRegistry, RegistrationPage};
    ///
    /// let mut registry = PageRegistry::new();
    /// registry.register("register", Box::new(RegistrationPage));
    /// ```
    pub fn register(&mut self, name: &str, page: Box<dyn DynamicPage>) {
        self.pages.push((handler_key(name), page));
    }

    /// Invoca el handler que indica la clave centinela del mapa
    ///
    /// Retorna `None` si el mapa no trae centinela o si no hay página
    /// registrada bajo esa clave: eso es un fallo de dispatch y el
    /// worker lo convierte en un 404 sin cuerpo. Un handler registrado
    /// que devuelve `None` produce en cambio `Some("")`: página
    /// atendida, cuerpo vacío.
    pub fn dispatch(&self, variables: &HashMap<String, String>) -> Option<String> {
        let key = variables.get(SENTINEL_KEY)?;
        let page = self
            .pages
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, page)| page)?;
        Some(page.handle(variables).unwrap_or_default())
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Separa un target dinámico en clave de handler y mapa de variables
///
/// El target se parte por el marcador `.do` y debe quedar exactamente
/// en nombre y query no vacía; cualquier otra cosa es un fallo de
/// dispatch. La query pierde una `/` y una `?` iniciales si las trae y
/// se trocea en pares `nombre=valor`: un par sin `=` vale cadena vacía
/// y un nombre repetido se queda con el último valor. La clave del
/// handler se inserta también en el mapa, bajo la clave centinela, para
/// que la búsqueda y la invocación compartan una sola estructura.
///
/// # Ejemplo
/// ```
/// use webserver::pages::parse_variables;
///
/// let (key, variables) = parse_variables("/register.do?username=joe").unwrap();
/// assert_eq!(key, "pages.register");
/// assert_eq!(variables.get("username").map(String::as_str), Some("joe"));
/// ```
pub fn parse_variables(target: &str) -> Option<(String, HashMap<String, String>)> {
    let parts: Vec<&str> = target.split(DYNAMIC_PAGE_MARKER).collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return None;
    }

    let name = parts[0].strip_prefix('/').unwrap_or(parts[0]);
    let key = handler_key(name);

    let mut query = parts[1];
    query = query.strip_prefix('/').unwrap_or(query);
    query = query.strip_prefix('?').unwrap_or(query);

    let mut variables = HashMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((var, value)) => variables.insert(var.to_string(), value.to_string()),
            None => variables.insert(pair.to_string(), String::new()),
        };
    }
    variables.insert(SENTINEL_KEY.to_string(), key.clone());

    Some((key, variables))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Página de prueba que devuelve siempre lo mismo
    struct EchoPage;

    impl DynamicPage for EchoPage {
        fn handle(&self, variables: &HashMap<String, String>) -> Option<String> {
            Some(format!(
                "<html>eco {}</html>",
                variables.get("texto").map(String::as_str).unwrap_or("")
            ))
        }
    }

    /// Página de prueba que nunca produce salida
    struct SilentPage;

    impl DynamicPage for SilentPage {
        fn handle(&self, _variables: &HashMap<String, String>) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = PageRegistry::new();
        assert_eq!(registry.pages.len(), 0);
    }

    #[test]
    fn test_register_page() {
        let mut registry = PageRegistry::new();
        registry.register("eco", Box::new(EchoPage));

        assert_eq!(registry.pages.len(), 1);
        assert_eq!(registry.pages[0].0, "pages.eco");
    }

    #[test]
    fn test_dispatch_registered_page() {
        let mut registry = PageRegistry::new();
        registry.register("eco", Box::new(EchoPage));

        let (_, variables) = parse_variables("/eco.do?texto=hola").unwrap();
        let body = registry.dispatch(&variables);

        assert_eq!(body, Some("<html>eco hola</html>".to_string()));
    }

    #[test]
    fn test_dispatch_unregistered_key_fails() {
        let registry = PageRegistry::new();

        let (_, variables) = parse_variables("/desconocida.do?x=1").unwrap();

        assert_eq!(registry.dispatch(&variables), None);
    }

    #[test]
    fn test_dispatch_without_sentinel_fails() {
        let mut registry = PageRegistry::new();
        registry.register("eco", Box::new(EchoPage));

        let variables = HashMap::new();

        assert_eq!(registry.dispatch(&variables), None);
    }

    #[test]
    fn test_silent_handler_yields_empty_body() {
        let mut registry = PageRegistry::new();
        registry.register("muda", Box::new(SilentPage));

        let (_, variables) = parse_variables("/muda.do?x=1").unwrap();

        assert_eq!(registry.dispatch(&variables), Some(String::new()));
    }

    #[test]
    fn test_parse_variables_full_query() {
        let (key, variables) =
            parse_variables("/register.do?username=joe&name=A&surname=B&mail=a@b.c").unwrap();

        assert_eq!(key, "pages.register");
        assert_eq!(variables.get("username").map(String::as_str), Some("joe"));
        assert_eq!(variables.get("name").map(String::as_str), Some("A"));
        assert_eq!(variables.get("surname").map(String::as_str), Some("B"));
        assert_eq!(variables.get("mail").map(String::as_str), Some("a@b.c"));
        assert_eq!(
            variables.get(SENTINEL_KEY).map(String::as_str),
            Some("pages.register")
        );
    }

    #[test]
    fn test_parse_variables_pair_without_value() {
        let (_, variables) = parse_variables("/eco.do?debug&texto=hola").unwrap();

        assert_eq!(variables.get("debug").map(String::as_str), Some(""));
        assert_eq!(variables.get("texto").map(String::as_str), Some("hola"));
    }

    #[test]
    fn test_parse_variables_duplicate_keeps_last() {
        let (_, variables) = parse_variables("/eco.do?texto=uno&texto=dos").unwrap();

        assert_eq!(variables.get("texto").map(String::as_str), Some("dos"));
    }

    #[test]
    fn test_parse_variables_query_with_leading_slash() {
        let (_, variables) = parse_variables("/eco.do/?texto=hola").unwrap();

        assert_eq!(variables.get("texto").map(String::as_str), Some("hola"));
    }

    #[test]
    fn test_parse_variables_without_query_fails() {
        assert_eq!(parse_variables("/register.do"), None);
    }

    #[test]
    fn test_parse_variables_bare_question_mark() {
        // Query presente pero vacía: queda solo la clave centinela
        let (key, variables) = parse_variables("/eco.do?").unwrap();

        assert_eq!(key, "pages.eco");
        assert_eq!(variables.len(), 1);
        assert_eq!(
            variables.get(SENTINEL_KEY).map(String::as_str),
            Some("pages.eco")
        );
    }

    #[test]
    fn test_parse_variables_double_marker_fails() {
        assert_eq!(parse_variables("/a.do.do?x=1"), None);
    }

    #[test]
    fn test_handler_key_namespace() {
        assert_eq!(handler_key("register"), "pages.register");
        assert_eq!(handler_key(""), "pages.");
    }
}
