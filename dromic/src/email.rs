//! Outbound email for password resets and security notices.
//!
//! SMTP in production; the file transport drops `.eml` files into a directory for local
//! development and tests.

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::{path::Path, time::Duration};
use url::Url;

use crate::{
    config::{Config, EmailTransportConfig},
    errors::Error,
};

pub struct EmailService {
    transport: EmailTransport,
    from: String,
    dashboard_url: Url,
    reset_token_lifetime: Duration,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

fn internal(operation: &str, e: impl std::fmt::Display) -> Error {
    Error::Internal {
        operation: format!("{operation}: {e}"),
    }
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| internal("create SMTP transport", e))?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                std::fs::create_dir_all(emails_dir).map_err(|e| internal("create emails directory", e))?;
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from: format!("{} <{}>", email_config.from_name, email_config.from_email),
            dashboard_url: config.dashboard_url.clone(),
            reset_token_lifetime: config.auth.password_reset_token_duration,
        })
    }

    /// Link the user follows to choose a new password.
    pub fn reset_link(&self, token: &str) -> String {
        let mut url = self.dashboard_url.clone();
        url.set_path("/reset-password");
        url.query_pairs_mut().clear().append_pair("token", token);
        url.to_string()
    }

    pub async fn send_password_reset_email(&self, to_email: &str, to_name: &str, token: &str) -> Result<(), Error> {
        let body = self.password_reset_body(to_name, &self.reset_link(token));
        self.send_email(to_email, Some(to_name), "DROMIC-IS Password Reset Request", &body)
            .await
    }

    pub async fn send_password_changed_email(&self, to_email: &str, to_name: &str) -> Result<(), Error> {
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2>Your password was changed</h2>
    <p>Hello {to_name},</p>
    <p>The password for your DROMIC-IS account was just changed. If this was not you, contact your
    system administrator immediately.</p>
</body>
</html>"#
        );
        self.send_email(to_email, Some(to_name), "DROMIC-IS Password Changed", &body).await
    }

    async fn send_email(&self, to_email: &str, to_name: Option<&str>, subject: &str, body: &str) -> Result<(), Error> {
        let from = self
            .from
            .parse::<Mailbox>()
            .map_err(|e| internal("parse from email", e))?;

        let to = match to_name {
            Some(name) => format!("{name} <{to_email}>"),
            None => to_email.to_string(),
        }
        .parse::<Mailbox>()
        .map_err(|e| internal("parse to email", e))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| internal("build email message", e))?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| internal("send SMTP email", e))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| internal("send file email", e))?;
            }
        }

        Ok(())
    }

    fn password_reset_body(&self, to_name: &str, reset_link: &str) -> String {
        let minutes = self.reset_token_lifetime.as_secs() / 60;

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Password Reset Request</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>DROMIC-IS Password Reset</h2>

        <p>Hello {to_name},</p>

        <p>We received a request to reset the password for your DROMIC-IS account. If you did not
        make this request, you can ignore this email.</p>

        <p><a href="{reset_link}">Reset your password</a></p>

        <p>Or paste this link into your browser:</p>
        <p>{reset_link}</p>

        <p>This link expires in {minutes} minutes.</p>

        <div class="footer">
            <p>Disaster Response Operations Monitoring and Information Center</p>
            <p>This is an automated message, please do not reply.</p>
        </div>
    </div>
</body>
</html>"#
        )
    }
}
