//! E-mail bodies.

use interbox_core::models::{Insurance, Registration};
use interbox_core::pricing::format_brl;

use super::Email;

const EVENT: &str = "INTERBØX 2025";

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<div style="font-family:Arial,sans-serif;max-width:560px;margin:0 auto;color:#1a1a1a">
<h1 style="color:#db1472">{title}</h1>
{body}
<p style="color:#777;font-size:12px">{EVENT}</p>
</div>"#
    )
}

pub fn registration_received(registration: &Registration) -> Email {
    let name = escape_html(&registration.name);
    let role = registration.kind.label();
    let mut paragraphs = vec![
        format!("Olá, {name}!"),
        format!("Recebemos sua inscrição como <strong>{role}</strong> no {EVENT}."),
    ];
    if registration.fee > 0 {
        paragraphs.push(format!(
            "Taxa de inscrição: <strong>{}</strong>. Sua vaga é confirmada após o pagamento via PIX.",
            format_brl(registration.fee)
        ));
    } else {
        paragraphs.push("Nossa equipe entrará em contato com os próximos passos.".to_string());
    }
    Email {
        to: vec![registration.email.clone()],
        subject: format!("Inscrição {role} recebida - {EVENT}"),
        html: layout("Inscrição recebida", &paragraphs),
        copy_admin: true,
    }
}

pub fn insurance_received(insurance: &Insurance) -> Email {
    let name = escape_html(&insurance.name);
    let paragraphs = vec![
        format!("Olá, {name}!"),
        format!(
            "Recebemos sua solicitação de seguro. Valor: <strong>{}</strong>.",
            format_brl(insurance.fee)
        ),
        "Assim que o pagamento for confirmado você receberá um novo e-mail.".to_string(),
    ];
    Email {
        to: vec![insurance.email.clone()],
        subject: format!("Solicitação de seguro recebida - {EVENT}"),
        html: layout("Seguro solicitado", &paragraphs),
        copy_admin: false,
    }
}

/// Sent from the payment webhook.
pub fn payment_confirmed(to: &str, name: &str, what: &str, value: i64) -> Email {
    let paragraphs = vec![
        format!("Olá, {}!", escape_html(name)),
        format!(
            "Confirmamos o pagamento de <strong>{}</strong> referente a {}.",
            format_brl(value),
            escape_html(what)
        ),
        "Nos vemos no evento!".to_string(),
    ];
    Email {
        to: vec![to.to_string()],
        subject: format!("Pagamento confirmado - {EVENT}"),
        html: layout("Pagamento confirmado", &paragraphs),
        copy_admin: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use interbox_core::models::{RegistrationStatus, RegistrationType};

    use super::*;

    fn registration(fee: i64) -> Registration {
        Registration {
            id: "r1".into(),
            name: "Ana <script>".into(),
            email: "ana@example.com".into(),
            phone: "11987654321".into(),
            cpf: "52998224725".into(),
            kind: RegistrationType::Audiovisual,
            fee,
            status: RegistrationStatus::Registered,
            experience: None,
            motivation: None,
            availability: None,
            correlation_id: None,
            created_at: None,
        }
    }

    #[test]
    fn names_are_escaped() {
        let email = registration_received(&registration(0));
        assert!(email.html.contains("Ana &lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn paid_registration_mentions_fee() {
        let email = registration_received(&registration(2_990));
        assert!(email.html.contains("R$ 29,90"));
        assert_eq!(email.to, vec!["ana@example.com"]);
        assert!(email.subject.contains("Audiovisual"));
        assert!(email.copy_admin);
    }

    #[test]
    fn payment_confirmation() {
        let email = payment_confirmed("a@b.co", "Bruno", "ingresso vip", 25_000);
        assert!(email.html.contains("R$ 250,00"));
        assert!(email.html.contains("ingresso vip"));
        assert!(!email.copy_admin);
    }
}
