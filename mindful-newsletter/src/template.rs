//! HTML e-mail templates.

use crate::email::OutgoingEmail;

/// Subject line of the welcome message
pub const WELCOME_SUBJECT: &str = "Bem-vindo à jornada Being Mindful! 🌟";

/// Link behind the call-to-action button
pub const BLOG_URL: &str = "https://being-mindful.com/blog";

const LOGO_URL: &str = "https://being-mindful.com/logo.png";

const FEATURES: [&str; 3] = [
    "Desenvolver uma mentalidade mais forte e resiliente",
    "Criar hábitos alinhados com seus objetivos",
    "Construir uma vida com mais propósito e equilíbrio",
];

const SOCIAL_LINKS: [(&str, &str); 3] = [
    ("Instagram", "https://instagram.com/beingmindful"),
    ("YouTube", "https://youtube.com/beingmindful"),
    ("LinkedIn", "https://linkedin.com/company/beingmindful"),
];

/// A rendered message not yet addressed to anyone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

impl RenderedEmail {
    #[must_use]
    pub fn addressed_to(self, to: impl Into<String>) -> OutgoingEmail {
        OutgoingEmail::new(to, self.subject, self.html)
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Welcome message sent after a subscription.
///
/// `name` is untrusted input and is escaped; `year` goes into the footer.
#[must_use]
pub fn welcome_email(name: &str, year: i32) -> RenderedEmail {
    let name = escape_html(name);

    let features: String = FEATURES
        .iter()
        .map(|feature| {
            format!(
                r#"<div style="margin-bottom: 20px; background: rgba(45,212,191,0.1); padding: 15px; border-radius: 10px; color: #E2E8F0;">{feature}</div>"#
            )
        })
        .collect();

    let social: String = SOCIAL_LINKS
        .iter()
        .map(|(label, url)| {
            format!(r#"<a href="{url}" style="color: #2DD4BF; text-decoration: none; margin: 0 10px;">{label}</a>"#)
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Bem-vindo ao Being Mindful</title>
  </head>
  <body style="margin: 0; padding: 0; background-color: #0B1221; font-family: Arial, sans-serif;">
    <div style="max-width: 600px; margin: 0 auto;">
      <div style="text-align: center; padding: 40px 20px;">
        <img src="{LOGO_URL}" alt="Being Mindful Logo" style="width: 120px; height: auto;">
      </div>
      <div style="padding: 40px 30px; color: #F3F4F6;">
        <h1 style="margin: 0 0 20px 0; font-size: 28px; text-align: center;">Olá {name}!</h1>
        <p style="font-size: 18px; line-height: 1.6; color: #94A3B8; text-align: center;">Seja muito bem-vindo(a) à comunidade Being Mindful</p>
        <p style="color: #E2E8F0; font-size: 16px; line-height: 1.6;">Estamos muito felizes em ter você conosco nessa jornada de desenvolvimento pessoal e mindfulness. Aqui, você encontrará conteúdo exclusivo e ferramentas práticas para:</p>
        <div style="margin: 30px 0;">{features}</div>
        <p style="color: #E2E8F0; font-size: 16px; line-height: 1.6;">A partir de agora, você receberá nossos melhores conteúdos diretamente no seu email.</p>
        <div style="text-align: center; margin: 40px 0;">
          <a href="{BLOG_URL}" style="display: inline-block; padding: 15px 30px; background: #2DD4BF; color: white; text-decoration: none; border-radius: 8px; font-weight: bold;">Explorar Conteúdos</a>
        </div>
        <p style="color: #94A3B8; font-style: italic; text-align: center;">"A jornada de mil milhas começa com um único passo." - Lao Tzu</p>
      </div>
      <div style="padding: 30px; text-align: center;">
        <p style="color: #94A3B8; font-size: 14px;">Siga-nos nas redes sociais para mais conteúdo</p>
        <div style="margin-bottom: 20px;">{social}</div>
        <p style="color: #64748B; font-size: 12px;">© {year} Being Mindful. Todos os direitos reservados.</p>
      </div>
    </div>
  </body>
</html>
"#
    );

    RenderedEmail {
        subject: WELCOME_SUBJECT.to_string(),
        html,
    }
}

/// Subject line of forwarded contact-form messages
pub const CONTACT_FORM_SUBJECT: &str = "Nova mensagem do formulário de contato";

/// Placeholder the mail provider replaces with the recipient's unsubscribe link
pub const UNSUBSCRIBE_PLACEHOLDER: &str = "{{{RESEND_UNSUBSCRIBE_URL}}}";

/// Newsletter issue sent to the whole audience.
///
/// `content_html` is authored markup and is inserted as-is. The subject and
/// preview text are escaped.
#[must_use]
pub fn newsletter_email(
    subject: &str,
    content_html: &str,
    preview_text: Option<&str>,
) -> RenderedEmail {
    let title = escape_html(subject);
    let preview = preview_text
        .map(|text| format!(r#"<meta name="description" content="{}">"#, escape_html(text)))
        .unwrap_or_default();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {preview}
    <title>{title}</title>
  </head>
  <body style="margin: 0; padding: 0; background-color: #f9fafb;">
    <div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; background-color: white;">
      <div style="background: #2DD4BF; padding: 20px; text-align: center;">
        <h1 style="color: white; margin: 0; font-size: 24px;">Being Mindful</h1>
      </div>
      <div style="padding: 30px 20px;">
{content_html}
      </div>
      <div style="background-color: #f3f4f6; padding: 20px; text-align: center; font-size: 14px; color: #6b7280;">
        <p style="margin: 0 0 10px 0;">Você está recebendo este email porque se inscreveu em nossa newsletter.</p>
        <p style="margin: 0;"><a href="{UNSUBSCRIBE_PLACEHOLDER}" style="color: #2DD4BF; text-decoration: none;">Cancelar inscrição</a></p>
      </div>
    </div>
  </body>
</html>
"#
    );

    RenderedEmail {
        subject: subject.to_string(),
        html,
    }
}

/// Contact-form submission forwarded to the site inbox. All fields are escaped.
#[must_use]
pub fn contact_form_email(name: &str, email: &str, message: &str) -> RenderedEmail {
    let name = escape_html(name);
    let email = escape_html(email);
    let message = escape_html(message);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Nova mensagem recebida</h2>
  <p><strong>Nome:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Mensagem:</strong></p>
  <p style="white-space: pre-wrap;">{message}</p>
</div>
"#
    );

    RenderedEmail {
        subject: CONTACT_FORM_SUBJECT.to_string(),
        html,
    }
}
