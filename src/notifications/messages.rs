//! Plain-text bodies for every email the shop sends.

use crate::models::{CustomOrder, CustomOrderStatus};

use super::OutgoingEmail;

const SIGNATURE: &str = "Thank you,\nThe Rugly Barnacle Team";

pub fn owner_new_custom_order(owner: &str, order: &CustomOrder, has_images: bool) -> OutgoingEmail {
    let image_status = if has_images {
        "INCLUDES REFERENCE IMAGE(S)"
    } else {
        "NO REFERENCE IMAGES - consider asking for visual references"
    };
    let image_action = if has_images {
        "- Check the reference images"
    } else {
        "- Consider asking the customer for reference images"
    };

    let body = format!(
        "NEW CUSTOM ORDER RECEIVED\n\n\
         Reference ID: #{reference}\n\
         Customer Name: {name}\n\
         Customer Email: {email}\n\
         Preferred Contact: {method}\n\
         Contact Info: {contact}\n\
         Image Status: {image_status}\n\n\
         DESIGN DESCRIPTION\n{description}\n\n\
         Status: {status}\n\
         Submitted: {submitted}\n\n\
         ACTION REQUIRED\n\
         - Review the order details above\n\
         {image_action}\n\
         - Update the order status\n\
         - Contact the customer within 24-48 hours with a quote and timeline",
        reference = order.reference_id,
        name = order.customer_name,
        email = order.email.as_deref().unwrap_or("not provided"),
        method = order.contact_method.label(),
        contact = order.contact_info.as_deref().unwrap_or("Use email above"),
        description = order.description.as_deref().unwrap_or(""),
        status = order.status.label(),
        submitted = order.created_at.format("%B %d, %Y at %I:%M %p"),
    );

    OutgoingEmail {
        to: owner.to_string(),
        subject: format!("RB New Custom Order - #{}", order.reference_id),
        body,
        reply_to: order.email.clone(),
    }
}

/// `None` when the customer gave no email address.
pub fn customer_confirmation(order: &CustomOrder, has_images: bool) -> Option<OutgoingEmail> {
    let to = order.email.clone()?;
    let images = if has_images {
        "I've received your reference image and will use it as a visual guide while \
         creating your custom rug. Feel free to reply with more inspiration photos."
    } else {
        "Reference images are incredibly helpful. You can send photos, color swatches \
         or design inspiration by replying to this email."
    };

    let body = format!(
        "Thank you for your custom order with Rugly Barnacle!\n\n\
         Order Reference: #{reference}\n\
         Customer Name: {name}\n\
         Submitted: {submitted}\n\n\
         {images}\n\n\
         WHAT HAPPENS NEXT\n\
         1. I'll review your design request within 24-48 hours\n\
         2. You'll receive a quote and timeline for your custom rug\n\
         3. Once approved, I'll begin creating your unique piece\n\n\
         DESIGN DETAILS\n{description}\n\n\
         If you have any questions, simply reply to this email.",
        reference = order.reference_id,
        name = order.customer_name,
        submitted = order.created_at.format("%B %d, %Y at %I:%M %p"),
        description = order.description.as_deref().unwrap_or(""),
    );

    Some(OutgoingEmail {
        to,
        subject: format!("Custom Order Request - #{}", order.reference_id),
        body,
        reply_to: None,
    })
}

pub fn status_subject(order: &CustomOrder) -> String {
    let reference = &order.reference_id;
    match order.status {
        CustomOrderStatus::Accepted => format!("Order Accepted! - #{reference}"),
        CustomOrderStatus::InProgress => format!("Order In Progress! - #{reference}"),
        CustomOrderStatus::Completed => format!("Order Completed! - #{reference}"),
        CustomOrderStatus::Declined | CustomOrderStatus::Pending => {
            format!("Order Update - #{reference}")
        }
    }
}

fn status_sentence(status: CustomOrderStatus) -> &'static str {
    match status {
        CustomOrderStatus::Accepted => {
            "has been accepted! A $50 deposit via Zelle/Venmo is required to secure your spot. \
             The remaining balance is due after the rug is completed."
        }
        CustomOrderStatus::InProgress => {
            "is now in progress! Your rug is being created. The balance will be requested \
             when your rug is finished."
        }
        CustomOrderStatus::Completed => {
            "is completed! Your rug is ready. Please submit the remaining balance via \
             Zelle/Venmo to start shipping."
        }
        CustomOrderStatus::Declined => "could not be accepted at this time.",
        CustomOrderStatus::Pending => "has been updated.",
    }
}

fn image_note(status: CustomOrderStatus, has_images: bool) -> &'static str {
    match (status, has_images) {
        (CustomOrderStatus::Accepted, true) => {
            "Your reference images give me a great starting point for your design!"
        }
        (CustomOrderStatus::InProgress, true) => {
            "I'm using your reference images to guide the creation process."
        }
        (CustomOrderStatus::Completed, true) => {
            "Your reference images were invaluable in creating the final design!"
        }
        (CustomOrderStatus::Accepted, false) => {
            "Want to send reference images? Just reply with photos."
        }
        (CustomOrderStatus::InProgress, false) => {
            "It's not too late to send reference images if you have any."
        }
        _ => "",
    }
}

/// `None` when the order has no customer email.
pub fn status_update(order: &CustomOrder, has_images: bool) -> Option<OutgoingEmail> {
    let to = order.email.clone()?;

    let mut body = format!(
        "Order Status Update\n\n\
         Order Reference: #{reference}\n\n\
         Hi {name},\n\n\
         Your custom rug order {sentence}\n",
        reference = order.reference_id,
        name = order.customer_name,
        sentence = status_sentence(order.status),
    );
    let note = image_note(order.status, has_images);
    if !note.is_empty() {
        body.push('\n');
        body.push_str(note);
        body.push('\n');
    }
    if let Some(notes) = order.admin_notes.as_deref().filter(|n| !n.is_empty()) {
        body.push_str(&format!("\nUpdate: {notes}\n"));
    }
    body.push_str(&format!(
        "\nCurrent Status: {}\n\nIf you have any questions, please reply to this email.\n\n{SIGNATURE}",
        order.status.label()
    ));

    Some(OutgoingEmail {
        to,
        subject: status_subject(order),
        body,
        reply_to: None,
    })
}

pub fn newsletter_welcome(address: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: address.to_string(),
        subject: "Welcome to the Rugly Barnacle newsletter".to_string(),
        body: format!(
            "Thanks for subscribing!\n\n\
             You'll hear about new rugs, events and behind-the-scenes posts first.\n\
             To stop receiving these emails, unsubscribe from the shop website.\n\n{SIGNATURE}"
        ),
        reply_to: None,
    }
}

pub fn newsletter_issue(address: &str, subject: &str, body: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: address.to_string(),
        subject: subject.to_string(),
        body: format!("{body}\n\n--\nYou are receiving this because you subscribed at the Rugly Barnacle shop."),
        reply_to: None,
    }
}
