//! High-level gateway operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use buckaroo_lib::prelude::*;
//!
//! let gateway = Gateway::new(GatewayConfig::from_env()?)?;
//! let options = SetupTransactionOptions::new(PaymentMethod::Ideal, "10".parse()?, "12345")
//!     .with_issuer("INGBNL2A")
//!     .with_return_url("https://shop.example/return");
//! let response = gateway.setup_transaction(&options).await?;
//! println!("redirect to {:?}", response.redirect_url());
//! ```

use crate::config::GatewayConfig;
use crate::ideal;
use crate::params::ResponseParams;
use crate::payment_method::PaymentMethod;
use crate::request::{
    RecurrentTransactionOptions, RefundDetails, RefundTransactionOptions, Request,
    RequestBuilder, SetupTransactionOptions, StatusOptions, TransactionSpecificationOptions,
};
use crate::response::{
    CallbackResponse, CancelResponse, RecurrentTransactionResponse, RefundInfoResponse,
    RefundTransactionResponse, Response, SetupTransactionResponse, StatusResponse,
    TransactionSpecificationResponse,
};
use crate::signature::Signer;
use crate::transport::{HttpTransport, Transport};
use crate::{BuckarooError, Result};

/// Client for the NVP gateway.
pub struct Gateway<T> {
    config: GatewayConfig,
    signer: Signer,
    builder: RequestBuilder,
    transport: T,
}

impl Gateway<HttpTransport> {
    /// Create a gateway that talks HTTP.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Gateway<T> {
    /// Create a gateway with a custom transport.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            signer: Signer::from_config(&config),
            builder: RequestBuilder::new(&config),
            config,
            transport,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// iDEAL issuers, as `(bic, name)` pairs.
    pub fn issuers(&self, payment_method: PaymentMethod) -> Result<&'static [(&'static str, &'static str)]> {
        if !payment_method.is_ideal() {
            return Err(BuckarooError::invalid_argument(
                "payment method",
                format!("{} (only iDEAL is supported)", payment_method),
            ));
        }
        Ok(ideal::ISSUERS)
    }

    /// Start a new transaction.
    #[tracing::instrument(skip(self, options), fields(method = %options.payment_method, invoice = %options.invoicenumber))]
    pub async fn setup_transaction(
        &self,
        options: &SetupTransactionOptions,
    ) -> Result<SetupTransactionResponse> {
        options.validate()?;
        let response = self.execute(self.builder.setup_transaction(options)).await?;
        SetupTransactionResponse::from_response(response)
    }

    /// Charge a recurrent payment on an earlier transaction.
    #[tracing::instrument(skip(self, options), fields(method = %options.payment_method, invoice = %options.invoicenumber))]
    pub async fn recurrent_transaction(
        &self,
        options: &RecurrentTransactionOptions,
    ) -> Result<RecurrentTransactionResponse> {
        options.validate()?;
        let response = self
            .execute(self.builder.recurrent_transaction(options))
            .await?;
        RecurrentTransactionResponse::from_response(response)
    }

    /// Returns true if the transaction can be refunded.
    #[tracing::instrument(skip(self))]
    pub async fn is_refundable(&self, transaction_id: &str) -> Result<bool> {
        Ok(self.refund_info(transaction_id).await?.is_refundable())
    }

    /// Refund a transaction.
    ///
    /// Payment method, invoice number and currency come from the refund
    /// information; the amount defaults to the maximum refundable amount.
    #[tracing::instrument(skip(self, options), fields(transaction = %options.transaction_id))]
    pub async fn refund_transaction(
        &self,
        options: &RefundTransactionOptions,
    ) -> Result<RefundTransactionResponse> {
        options.validate()?;

        let info = self.refund_info(&options.transaction_id).await?;
        if !info.is_refundable() {
            return Err(BuckarooError::NonRefundable {
                transaction_id: options.transaction_id.clone(),
            });
        }

        let amount = match options.amount {
            Some(amount) => amount,
            None => info
                .maximum_amount()
                .ok_or_else(|| BuckarooError::missing("brq_refundinfo_1_maximumrefundamount"))?,
        };
        let details = RefundDetails {
            payment_method: refund_field(info.payment_method(), "brq_refundinfo_1_servicecode")?,
            amount,
            invoicenumber: refund_field(info.invoicenumber(), "brq_refundinfo_1_invoice")?,
            currency: refund_field(info.currency(), "brq_refundinfo_1_refundcurrency")?,
        };
        tracing::debug!(amount = %details.amount, method = %details.payment_method, "refunding");

        let response = self
            .execute(self.builder.refund_transaction(options, &details))
            .await?;
        RefundTransactionResponse::from_response(response)
    }

    /// Get the status of a transaction.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self, options: &StatusOptions) -> Result<StatusResponse> {
        options.validate()?;
        let response = self.execute(self.builder.status(options)).await?;
        StatusResponse::from_response(response)
    }

    /// Returns true if the transaction can be cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn is_cancellable(&self, transaction_id: &str) -> Result<bool> {
        Ok(self.status_of(transaction_id).await?.is_cancellable())
    }

    /// Cancel a transaction that is still cancellable.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_transaction(&self, transaction_id: &str) -> Result<CancelResponse> {
        if !self.status_of(transaction_id).await?.is_cancellable() {
            return Err(BuckarooError::NonCancellable {
                transaction_id: transaction_id.to_string(),
            });
        }

        let response = self.execute(self.builder.cancel(transaction_id)).await?;
        CancelResponse::from_response(response)
    }

    /// Get the field specification of one or more services.
    #[tracing::instrument(skip(self))]
    pub async fn specify_transaction(
        &self,
        options: &TransactionSpecificationOptions,
    ) -> Result<TransactionSpecificationResponse> {
        let response = self.execute(self.builder.specification(options)).await?;
        TransactionSpecificationResponse::from_response(response)
    }

    /// Verify a push notification body.
    pub fn callback(&self, body: &[u8]) -> Result<CallbackResponse> {
        self.callback_params(crate::codec::decode(body))
    }

    /// Verify already decoded push notification parameters.
    pub fn callback_params(&self, params: ResponseParams) -> Result<CallbackResponse> {
        if params.is_empty() {
            return Err(BuckarooError::invalid_argument(
                "callback",
                "no callback parameters found",
            ));
        }
        CallbackResponse::from_response(Response::from_params(params, &self.signer)?)
    }

    async fn refund_info(&self, transaction_id: &str) -> Result<RefundInfoResponse> {
        require_transaction_id(transaction_id)?;
        let response = self.execute(self.builder.refund_info(transaction_id)).await?;
        RefundInfoResponse::from_response(response)
    }

    async fn status_of(&self, transaction_id: &str) -> Result<StatusResponse> {
        require_transaction_id(transaction_id)?;
        self.status(&StatusOptions::transaction(transaction_id)).await
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let url = request.url(self.config.api_url())?;
        tracing::debug!(operation = %request.operation(), %url, "sending request");

        let body = self.transport.post_form(&url, request.body()).await?;
        Response::parse_api(&body, &self.signer)
    }
}

fn require_transaction_id(transaction_id: &str) -> Result<()> {
    if transaction_id.is_empty() {
        return Err(BuckarooError::missing("transaction_id"));
    }
    Ok(())
}

fn refund_field(value: Option<&str>, name: &str) -> Result<String> {
    value
        .map(str::to_owned)
        .ok_or_else(|| BuckarooError::missing(name))
}
