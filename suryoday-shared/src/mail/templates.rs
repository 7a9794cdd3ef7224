//! Message templates
//!
//! Every interpolated value is HTML-escaped.

use super::EmailMessage;

/// Login details handed to a new account holder
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub temporary_password: &'a str,
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h1 style="font-size: 24px;">{heading}</h1>
{body}
<p style="color: #6b7280; font-size: 12px;">Suryoday Old Age Home</p>
</div>"#
    )
}

fn button(url: &str, label: &str) -> String {
    format!(
        r#"<p style="text-align: center; margin: 30px 0;"><a href="{}" style="padding: 12px 30px; font-weight: bold;">{}</a></p>"#,
        escape(url),
        escape(label)
    )
}

fn credentials_block(credentials: &Credentials<'_>) -> String {
    format!(
        "<p><strong>Email:</strong> {}<br/><strong>Temporary Password:</strong> <code>{}</code></p>\
         <p>Please change your password after your first login.</p>",
        escape(credentials.email),
        escape(credentials.temporary_password)
    )
}

pub fn volunteer_approved(
    name: &str,
    credentials: Option<Credentials<'_>>,
    portal_url: &str,
) -> EmailMessage {
    let mut body = format!(
        "<p>Dear {},</p><p>We are delighted to inform you that your volunteer application has been \
         <strong>approved</strong>.</p>",
        escape(name)
    );
    if let Some(credentials) = credentials {
        body.push_str(&credentials_block(&credentials));
    }
    body.push_str(&button(&format!("{portal_url}/volunteer-portal"), "Access Volunteer Portal"));

    EmailMessage {
        subject: "Your Volunteer Application has been Approved!".into(),
        html: layout("Welcome to the Suryoday family!", &body),
    }
}

pub fn volunteer_rejected(name: &str, reason: &str) -> EmailMessage {
    let mut body = format!(
        "<p>Dear {},</p><p>Thank you for your interest in volunteering with us. After careful \
         consideration we are unable to proceed with your application at this time.</p>",
        escape(name)
    );
    if !reason.trim().is_empty() {
        body.push_str(&format!("<p><strong>Reason:</strong> {}</p>", escape(reason)));
    }
    body.push_str("<p>You are welcome to apply again in the future.</p>");

    EmailMessage {
        subject: "Update on Your Volunteer Application".into(),
        html: layout("Application Status Update", &body),
    }
}

pub fn task_assigned(
    name: &str,
    title: &str,
    description: &str,
    due_date: &str,
    portal_url: &str,
) -> EmailMessage {
    let body = format!(
        "<p>Hello {},</p><p>You have been assigned a new task:</p>\
         <h2>{}</h2><p>{}</p><p><strong>Due Date:</strong> {}</p>{}",
        escape(name),
        escape(title),
        escape(description),
        escape(due_date),
        button(&format!("{portal_url}/volunteer-portal"), "View Task Details"),
    );

    EmailMessage {
        subject: "New Task Assigned".into(),
        html: layout("New Task Assignment", &body),
    }
}

pub fn welcome(name: &str, role: &str, credentials: Credentials<'_>, portal_url: &str) -> EmailMessage {
    let body = format!(
        "<p>Hello {},</p><p>Your {} account has been created.</p>{}{}",
        escape(name),
        escape(role),
        credentials_block(&credentials),
        button(&format!("{portal_url}/dashboard"), "Login to Dashboard"),
    );

    EmailMessage {
        subject: "Your Account Has Been Created".into(),
        html: layout("Welcome to Suryoday!", &body),
    }
}
