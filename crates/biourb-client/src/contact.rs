use crate::error::ClientError;

/// The contact page form. Delivery goes through a third-party mail service
/// that this crate does not talk to; only the local checks live here.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ClientError> {
        let blank = [&self.name, &self.email, &self.message]
            .iter()
            .any(|field| field.trim().is_empty());
        if blank {
            return Err(ClientError::Validation("Fill in every field!".into()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
