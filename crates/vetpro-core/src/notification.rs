//! WhatsApp deep links and message templates.
//!
//! Everything here is pure string formatting: no network access, no state.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Characters left untouched by a URI component encoder.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build `https://wa.me/<digits>?text=<encoded message>`.
///
/// Every non-digit character is stripped from `phone`.
pub fn build_whatsapp_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!(
        "{}/{}?text={}",
        WHATSAPP_BASE_URL,
        digits,
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

pub fn appointment_reminder_message(
    pet_name: &str,
    service: &str,
    date: &str,
    time: &str,
    clinic_name: &str,
) -> String {
    format!(
        "¡Hola! 👋 Te recordamos tu turno en *{clinic_name}*.\n\n\
         🐶 Paciente: *{pet_name}*\n\
         🩺 Servicio: *{service}*\n\
         📅 Fecha: *{date}*\n\
         ⏰ Hora: *{time}*\n\n\
         Por favor, confirma tu asistencia respondiendo a este mensaje. ¡Te esperamos!"
    )
}

pub fn budget_message(pet_name: &str, total: &str, clinic_name: &str) -> String {
    format!(
        "¡Hola! 👋 Te enviamos el presupuesto solicitado para *{pet_name}* de *{clinic_name}*.\n\n\
         💰 Total estimado: *{total}*\n\n\
         Puedes confirmar el servicio por este medio para agendar el turno correspondiente."
    )
}
