//! # Página de Registro
//! src/pages/registration.rs
//!
//! Página dinámica de ejemplo: confirma un alta de usuario repitiendo
//! los datos que llegaron en la query. Atiende targets de la forma
//! `/register.do?username=...&name=...&surname=...&mail=...`.

use std::collections::HashMap;

use super::DynamicPage;

/// Cabecera fija del documento de confirmación
const PAGE_HEADER: &str = "<html><head> <title>Confirmation</title> </head> ";

/// Cierre fijo del documento
const PAGE_FOOTER: &str = "</html>";

/// Página de confirmación de registro
///
/// # Ejemplo
/// ```
/// use std::collections::HashMap;
/// use webserver::pages::{DynamicPage, RegistrationPage};
///
/// let mut variables = HashMap::new();
/// variables.insert("username".to_string(), "joe".to_string());
///
/// let body = RegistrationPage.handle(&variables).unwrap();
/// assert!(body.contains("Congratulations joe!"));
/// ```
pub struct RegistrationPage;

impl DynamicPage for RegistrationPage {
    fn handle(&self, variables: &HashMap<String, String>) -> Option<String> {
        let username = field(variables, "username");
        let name = field(variables, "name");
        let surname = field(variables, "surname");
        let mail = field(variables, "mail");

        // El nombre completo se forma pegando nombre y apellido
        let complete_name = format!("{}{}", name, surname);

        let body = format!(
            "<body> <h1> Congratulations {}! Registration completed succesfully</h1>\
             <h2> Please check the following info:</h2>\n\
             <p>Name: {}</p>\n\
             <p> E-mail: {}</p>\n \
             <p> This data can be modified through the main page.</p>\n \
             <p>A verification e-mail will be sent soon. to {}</p>\
             <p>Thank you for using this service</p></body>",
            username, complete_name, mail, mail
        );

        Some(format!("{}{}{}", PAGE_HEADER, body, PAGE_FOOTER))
    }
}

/// Valor de una variable, o cadena vacía si el cliente no la envió
fn field<'a>(variables: &'a HashMap<String, String>, name: &str) -> &'a str {
    variables.get(name).map(String::as_str).unwrap_or("")
}
