//! Payment gateway abstraction and simulated implementations.
//!
//! The shape follows hosted payment services: an intent is created for the
//! amount, then confirmed with a tokenized payment method reference. In
//! production this module would delegate to a real processor SDK; here the
//! gateway is simulated, with a deterministic scripted variant for tests.

use crate::types::Money;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Payment gateway result
pub type GatewayResult<T> = Result<T, PaymentGatewayError>;

// ============================================================================
// Card Details and Validation
// ============================================================================

/// Raw card form input.
#[derive(Clone)]
pub struct CardDetails {
    /// Card number, possibly with whitespace grouping.
    pub number: String,
    /// Expiry in `MM/YY` form.
    pub expiry: String,
    /// Card verification code.
    pub cvc: String,
}

impl CardDetails {
    /// Creates card details from form fields.
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            expiry: expiry.into(),
            cvc: cvc.into(),
        }
    }
}

// Card numbers stay out of logs; Debug shows the last four digits only.
impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{}", last_four(&self.number)))
            .field("expiry", &self.expiry)
            .field("cvc", &"***")
            .finish()
    }
}

/// Shape check on card details, not a real validity check.
///
/// The number must have at least 15 characters once whitespace is stripped,
/// the expiry must contain a `/`, and the CVC must be at least 3 characters.
/// Anything stricter (Luhn, expiry in the future) is the gateway's business.
#[must_use]
pub fn validate_card(card: &CardDetails) -> bool {
    let number: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    number.len() >= 15 && card.expiry.contains('/') && card.cvc.len() >= 3
}

fn last_four(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}

// ============================================================================
// Gateway Wire Types
// ============================================================================

/// A payment intent issued by the gateway for a specific amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Gateway intent identifier (`pi_…`).
    pub id: String,
    /// Amount the intent will charge.
    pub amount: Money,
    /// Lifecycle status of the intent.
    pub status: PaymentIntentStatus,
    /// Client secret handed to the confirmation step (`secret_…`).
    pub client_secret: String,
}

/// Payment intent lifecycle status.
///
/// The simulated gateway only ever issues intents awaiting a payment method;
/// confirmation reports a [`PaymentDecision`] instead of advancing the
/// intent. A real integration would walk the full lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentIntentStatus {
    /// The intent is waiting for a payment method to be attached.
    RequiresPaymentMethod,
}

/// Opaque payment method token.
///
/// Derived from the card's last four digits, standing in for the
/// tokenization a real gateway SDK performs client-side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentMethodRef(String);

impl PaymentMethodRef {
    /// Tokenizes card details into a method reference.
    #[must_use]
    pub fn from_card(card: &CardDetails) -> Self {
        Self(format!("pm_card_{}", last_four(&card.number)))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a payment confirmation that reached the gateway.
///
/// A decline is a normal business outcome, not an error; gateway errors are
/// reserved for technical faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentDecision {
    /// The charge went through.
    Approved,
    /// The gateway refused the card.
    Declined,
}

/// Payment gateway error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentGatewayError {
    /// The gateway could not be reached or refused the conversation.
    Unavailable {
        /// Why the gateway is unavailable
        reason: String,
    },
    /// Gateway timeout
    Timeout,
}

impl fmt::Display for PaymentGatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "Payment gateway unavailable: {reason}"),
            Self::Timeout => write!(f, "Payment gateway timed out"),
        }
    }
}

impl std::error::Error for PaymentGatewayError {}

// ============================================================================
// Gateway Trait
// ============================================================================

/// Abstraction over payment processors.
///
/// Both operations are async and dyn-safe; implementations own their inputs
/// before the returned future runs.
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for `amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot issue an intent.
    fn create_intent(
        &self,
        amount: Money,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>>;

    /// Confirms an intent with a payment method.
    ///
    /// # Errors
    ///
    /// Returns an error for technical faults only; a refused card is
    /// reported as [`PaymentDecision::Declined`].
    fn confirm_payment(
        &self,
        intent: &PaymentIntent,
        method: &PaymentMethodRef,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentDecision>> + Send>>;
}

// ============================================================================
// Simulated Gateway
// ============================================================================

/// Simulated payment gateway for demos and development.
///
/// Issues intents after a short delay and approves confirmations with a
/// configurable probability, mimicking the latency and the occasional
/// decline of a real processor.
#[derive(Clone, Debug)]
pub struct SimulatedGateway {
    approval_rate: f64,
    intent_latency: Duration,
    confirm_latency: Duration,
}

impl SimulatedGateway {
    /// Approval probability used by [`SimulatedGateway::new`].
    pub const DEFAULT_APPROVAL_RATE: f64 = 0.95;

    /// Creates a gateway with the default approval rate and latencies
    /// (1 s to create an intent, 2 s to confirm).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            approval_rate: Self::DEFAULT_APPROVAL_RATE,
            intent_latency: Duration::from_secs(1),
            confirm_latency: Duration::from_secs(2),
        }
    }

    /// Sets the probability that a confirmation is approved.
    #[must_use]
    pub const fn with_approval_rate(mut self, rate: f64) -> Self {
        self.approval_rate = rate;
        self
    }

    /// Sets the simulated latencies for intent creation and confirmation.
    #[must_use]
    pub const fn with_latencies(mut self, intent: Duration, confirm: Duration) -> Self {
        self.intent_latency = intent;
        self.confirm_latency = confirm;
        self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<dyn PaymentGateway> {
        Arc::new(self)
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for SimulatedGateway {
    fn create_intent(
        &self,
        amount: Money,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>> {
        let latency = self.intent_latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;

            let id = format!("pi_{}", random_token(9));
            let client_secret = format!("secret_{}", random_token(20));

            tracing::debug!(
                intent_id = %id,
                amount = amount.cents(),
                "Created payment intent"
            );

            Ok(PaymentIntent {
                id,
                amount,
                status: PaymentIntentStatus::RequiresPaymentMethod,
                client_secret,
            })
        })
    }

    fn confirm_payment(
        &self,
        intent: &PaymentIntent,
        method: &PaymentMethodRef,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentDecision>> + Send>> {
        let latency = self.confirm_latency;
        let approval_rate = self.approval_rate;
        let intent_id = intent.id.clone();
        let method = method.clone();

        Box::pin(async move {
            tokio::time::sleep(latency).await;

            if rand::random::<f64>() < approval_rate {
                tracing::info!(intent_id = %intent_id, method = %method, "Payment approved");
                Ok(PaymentDecision::Approved)
            } else {
                tracing::info!(intent_id = %intent_id, method = %method, "Payment declined");
                Ok(PaymentDecision::Declined)
            }
        })
    }
}

fn random_token(length: usize) -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ============================================================================
// Scripted Gateway
// ============================================================================

/// A pre-programmed confirmation outcome for [`ScriptedGateway`].
#[derive(Clone, Debug)]
pub enum ConfirmOutcome {
    /// Approve the charge.
    Approve,
    /// Refuse the card.
    Decline,
    /// Fail technically with the given reason.
    Fail {
        /// Reported unavailability reason
        reason: String,
    },
}

/// Deterministic gateway for tests: zero latency, scripted outcomes.
///
/// Confirmations consume the script front-to-back, then repeat the fallback
/// outcome. Intent ids are sequential (`pi_test_1`, `pi_test_2`, …).
#[derive(Clone, Debug)]
pub struct ScriptedGateway {
    script: Arc<Mutex<VecDeque<ConfirmOutcome>>>,
    fallback: ConfirmOutcome,
    intents: Arc<AtomicU64>,
}

impl ScriptedGateway {
    /// A gateway that approves every confirmation.
    #[must_use]
    pub fn approving() -> Self {
        Self::with_outcomes([], ConfirmOutcome::Approve)
    }

    /// A gateway that declines every confirmation.
    #[must_use]
    pub fn declining() -> Self {
        Self::with_outcomes([], ConfirmOutcome::Decline)
    }

    /// A gateway that fails every confirmation technically.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::with_outcomes([], ConfirmOutcome::Fail { reason })
    }

    /// A gateway that plays `script` in order, then repeats `fallback`.
    #[must_use]
    pub fn with_outcomes(
        script: impl IntoIterator<Item = ConfirmOutcome>,
        fallback: ConfirmOutcome,
    ) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            fallback,
            intents: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<dyn PaymentGateway> {
        Arc::new(self)
    }

    fn next_outcome(&self) -> ConfirmOutcome {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl PaymentGateway for ScriptedGateway {
    fn create_intent(
        &self,
        amount: Money,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>> {
        let sequence = self.intents.fetch_add(1, Ordering::Relaxed) + 1;
        Box::pin(async move {
            Ok(PaymentIntent {
                id: format!("pi_test_{sequence}"),
                amount,
                status: PaymentIntentStatus::RequiresPaymentMethod,
                client_secret: format!("secret_test_{sequence}"),
            })
        })
    }

    fn confirm_payment(
        &self,
        intent: &PaymentIntent,
        _method: &PaymentMethodRef,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentDecision>> + Send>> {
        let outcome = self.next_outcome();
        let intent_id = intent.id.clone();
        Box::pin(async move {
            tracing::debug!(intent_id = %intent_id, ?outcome, "Scripted confirmation");
            match outcome {
                ConfirmOutcome::Approve => Ok(PaymentDecision::Approved),
                ConfirmOutcome::Decline => Ok(PaymentDecision::Declined),
                ConfirmOutcome::Fail { reason } => {
                    Err(PaymentGatewayError::Unavailable { reason })
                }
            }
        })
    }
}
