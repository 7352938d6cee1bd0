//! Contact form messages.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactMessage {
    #[validate(length(min = 1, message = "Navn er påkrævet"))]
    pub name: String,
    #[validate(email(message = "Indtast en gyldig email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Emne er påkrævet"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Besked er påkrævet"))]
    pub message: String,
}

impl ContactMessage {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt { pub id: Option<String> }
