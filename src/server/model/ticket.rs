use entity::ticket_scan::ScanChannel;

use crate::{
    model::ticket::{RedeemTicketDto, VerifyTicketDto},
    server::error::ticket::TicketError,
};

/// A redemption credential: either the scanned QR token or the manually
/// entered numeric backup code. Exactly one is presented per request.
#[derive(Clone, Debug, PartialEq)]
pub enum TicketCredential {
    QrCode(String),
    BackupCode(String),
}

impl TicketCredential {
    /// Builds a credential from the two optional request fields.
    ///
    /// # Returns
    /// - `Ok(TicketCredential)` - Exactly one field was supplied
    /// - `Err(TicketError::MissingCredential)` - Neither or both supplied
    pub fn from_fields(
        qr_code: Option<String>,
        backup_code: Option<String>,
    ) -> Result<Self, TicketError> {
        match (qr_code, backup_code) {
            (Some(qr), None) => Ok(Self::QrCode(qr)),
            (None, Some(code)) => Ok(Self::BackupCode(code)),
            _ => Err(TicketError::MissingCredential),
        }
    }

    /// The scan channel recorded in the audit trail for this credential.
    pub fn channel(&self) -> ScanChannel {
        match self {
            Self::QrCode(_) => ScanChannel::QrCode,
            Self::BackupCode(_) => ScanChannel::BackupCode,
        }
    }
}

impl TryFrom<VerifyTicketDto> for TicketCredential {
    type Error = TicketError;

    fn try_from(dto: VerifyTicketDto) -> Result<Self, Self::Error> {
        Self::from_fields(dto.qr_code, dto.backup_code)
    }
}

pub struct IssueTicketParams {
    pub payment_id: i32,
    pub event_id: i32,
    pub tier_id: i32,
    pub user_id: i32,
    pub cultural_selections: Option<serde_json::Value>,
}

/// Row fields for inserting a new ticket; codes are generated by the service
/// before this reaches the repository.
pub struct CreateTicketParams {
    pub event_id: i32,
    pub tier_id: i32,
    pub user_id: i32,
    pub payment_id: i32,
    pub qr_code: String,
    pub backup_code: String,
    pub cultural_selections: Option<serde_json::Value>,
}

/// Row fields for appending one scan audit record.
pub struct CreateScanParams {
    pub ticket_id: i32,
    pub scanned_by: i32,
    pub location: Option<String>,
    pub device_info: Option<String>,
    pub channel: ScanChannel,
}

pub struct RedeemTicketParams {
    pub credential: TicketCredential,
    pub agent_id: i32,
    pub location: Option<String>,
    pub device_info: Option<String>,
}

impl RedeemTicketParams {
    pub fn from_dto(agent_id: i32, dto: RedeemTicketDto) -> Result<Self, TicketError> {
        Ok(Self {
            credential: TicketCredential::from_fields(dto.qr_code, dto.backup_code)?,
            agent_id,
            location: dto.location,
            device_info: dto.device_info,
        })
    }
}
