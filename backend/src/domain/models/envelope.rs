//! Domain model for an allocation envelope.
use shared::{EnvelopeRecord, EnvelopeType};
use uuid::Uuid;

/// Allocation rule of an envelope.
///
/// A percentage envelope's `amount` is derived from its percentage and the
/// available-for-percentage pool on every recalculation and is never read as
/// input. A fixed envelope's `amount` is the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeKind {
    Percentage { percentage: f64, amount: f64 },
    Fixed { amount: f64 },
}

impl EnvelopeKind {
    pub fn envelope_type(&self) -> EnvelopeType {
        match self {
            EnvelopeKind::Percentage { .. } => EnvelopeType::Percentage,
            EnvelopeKind::Fixed { .. } => EnvelopeType::Fixed,
        }
    }

    /// Current amount: last computed value for percentage envelopes
    pub fn amount(&self) -> f64 {
        match self {
            EnvelopeKind::Percentage { amount, .. } | EnvelopeKind::Fixed { amount } => *amount,
        }
    }

    /// Percentage, or `None` for fixed envelopes
    pub fn percentage(&self) -> Option<f64> {
        match self {
            EnvelopeKind::Percentage { percentage, .. } => Some(*percentage),
            EnvelopeKind::Fixed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: String,
    pub name: String,
    pub kind: EnvelopeKind,
}

impl Envelope {
    pub fn generate_id() -> String {
        format!("envelope::{}", Uuid::new_v4())
    }

    /// New percentage envelope; its amount is filled in by the next recalculation
    pub fn new_percentage(name: &str, percentage: f64) -> Self {
        Self {
            id: Self::generate_id(),
            name: name.trim().to_string(),
            kind: EnvelopeKind::Percentage {
                percentage,
                amount: 0.0,
            },
        }
    }

    pub fn new_fixed(name: &str, amount: f64) -> Self {
        Self {
            id: Self::generate_id(),
            name: name.trim().to_string(),
            kind: EnvelopeKind::Fixed { amount },
        }
    }

    pub fn amount(&self) -> f64 {
        self.kind.amount()
    }

    pub fn percentage(&self) -> Option<f64> {
        self.kind.percentage()
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, EnvelopeKind::Fixed { .. })
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self.kind, EnvelopeKind::Percentage { .. })
    }

    /// Same envelope under a newly generated ID
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: Self::generate_id(),
            ..self.clone()
        }
    }
}

impl From<EnvelopeRecord> for Envelope {
    fn from(record: EnvelopeRecord) -> Self {
        // Records without a type predate fixed envelopes
        let kind = match record.envelope_type.unwrap_or(EnvelopeType::Percentage) {
            EnvelopeType::Percentage => EnvelopeKind::Percentage {
                percentage: record.percentage,
                amount: record.amount,
            },
            EnvelopeType::Fixed => EnvelopeKind::Fixed {
                amount: record.amount,
            },
        };

        Envelope {
            id: record.id,
            name: record.name,
            kind,
        }
    }
}

impl From<&Envelope> for EnvelopeRecord {
    fn from(envelope: &Envelope) -> Self {
        EnvelopeRecord {
            id: envelope.id.clone(),
            name: envelope.name.clone(),
            envelope_type: Some(envelope.kind.envelope_type()),
            percentage: envelope.percentage().unwrap_or(0.0),
            amount: envelope.amount(),
        }
    }
}
