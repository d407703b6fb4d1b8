//! Outgoing request construction.
//!
//! Every request body has the same envelope:
//!
//! 1. `brq_websitekey`
//! 2. operation specific parameters
//! 3. `cust_*` custom parameters, then `add_*` additional parameters
//! 4. `add_client` identifying this library
//! 5. `brq_signature`, always last

use std::fmt;

use chrono::NaiveDate;
use url::Url;

use crate::amount::Amount;
use crate::codec;
use crate::config::GatewayConfig;
use crate::ideal;
use crate::params::{ParamValue, ParameterSet};
use crate::payment_method::{Action, Language, Operation, PaymentMethod, DEFAULT_CURRENCY};
use crate::signature::Signer;
use crate::{BuckarooError, Result};

/// Parameter identifying the client library.
///
/// Sent on every request as `add_client = "buckaroo-lib <version>"` in place
/// of a library-specific `add_<name>` key. Being an `add_` field, it is
/// signed and echoed back by the gateway.
pub const CLIENT_KEY: &str = "add_client";

const SETUP_METHODS: &[PaymentMethod] = &[
    PaymentMethod::Ideal,
    PaymentMethod::IdealProcessing,
    PaymentMethod::Visa,
    PaymentMethod::MasterCard,
    PaymentMethod::Maestro,
    PaymentMethod::SepaDirectDebit,
    PaymentMethod::PayPal,
    PaymentMethod::BancontactMisterCash,
];

const RECURRENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod::Visa,
    PaymentMethod::MasterCard,
    PaymentMethod::Maestro,
    PaymentMethod::SepaDirectDebit,
    PaymentMethod::PayPal,
];

/// One payment method or a list of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentMethodSelection {
    /// A single service.
    Single(PaymentMethod),
    /// Several services, sent comma separated.
    Multiple(Vec<PaymentMethod>),
}

impl fmt::Display for PaymentMethodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(method) => f.write_str(method.as_str()),
            Self::Multiple(methods) => {
                let joined: Vec<&str> = methods.iter().map(PaymentMethod::as_str).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

impl From<PaymentMethod> for PaymentMethodSelection {
    fn from(method: PaymentMethod) -> Self {
        Self::Single(method)
    }
}

impl From<Vec<PaymentMethod>> for PaymentMethodSelection {
    fn from(methods: Vec<PaymentMethod>) -> Self {
        Self::Multiple(methods)
    }
}

fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BuckarooError::missing(name));
    }
    Ok(())
}

fn require_some(value: Option<&str>, name: &str) -> Result<()> {
    require(value.unwrap_or(""), name)
}

fn require_positive(amount: &Amount) -> Result<()> {
    if !amount.is_positive() {
        return Err(BuckarooError::invalid_argument(
            "amount",
            format!("{} (must be greater than 0)", amount),
        ));
    }
    Ok(())
}

fn require_method(method: PaymentMethod, allowed: &[PaymentMethod]) -> Result<()> {
    if !allowed.contains(&method) {
        return Err(BuckarooError::invalid_argument(
            "payment method",
            method.as_str(),
        ));
    }
    Ok(())
}

/// Options for starting a new transaction.
#[derive(Clone, Debug)]
pub struct SetupTransactionOptions {
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Amount to pay.
    pub amount: Amount,
    /// Merchant invoice number.
    pub invoicenumber: String,
    /// Currency, `EUR` when absent.
    pub currency: Option<String>,
    /// Culture, Dutch when absent.
    pub culture: Option<Language>,
    /// iDEAL issuer BIC.
    pub payment_issuer: Option<String>,
    /// URL the consumer returns to (required except for SEPA).
    pub return_url: Option<String>,
    /// Description shown to the consumer.
    pub description: Option<String>,
    /// Consumer IP address.
    pub client_ip: Option<String>,
    /// SEPA: consumer IBAN.
    pub account_iban: Option<String>,
    /// SEPA: account holder name.
    pub account_name: Option<String>,
    /// SEPA: consumer BIC.
    pub account_bic: Option<String>,
    /// SEPA: collect date.
    pub collect_date: Option<NaiveDate>,
    /// SEPA: mandate reference.
    pub mandate_reference: Option<String>,
    /// SEPA: mandate date, today when absent.
    pub mandate_date: Option<NaiveDate>,
    /// Start a recurring series.
    pub recurring: bool,
    /// Custom parameters, sent with a `cust_` prefix.
    pub custom: ParameterSet,
    /// Additional parameters, sent with an `add_` prefix.
    pub additional: ParameterSet,
}

impl SetupTransactionOptions {
    /// Create options with the always-required fields.
    pub fn new(
        payment_method: PaymentMethod,
        amount: Amount,
        invoicenumber: impl Into<String>,
    ) -> Self {
        Self {
            payment_method,
            amount,
            invoicenumber: invoicenumber.into(),
            currency: None,
            culture: None,
            payment_issuer: None,
            return_url: None,
            description: None,
            client_ip: None,
            account_iban: None,
            account_name: None,
            account_bic: None,
            collect_date: None,
            mandate_reference: None,
            mandate_date: None,
            recurring: false,
            custom: ParameterSet::new(),
            additional: ParameterSet::new(),
        }
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the culture.
    pub fn with_culture(mut self, culture: Language) -> Self {
        self.culture = Some(culture);
        self
    }

    /// Set the iDEAL issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.payment_issuer = Some(issuer.into());
        self
    }

    /// Set the return URL.
    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the consumer IP address.
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    /// Set the SEPA account holder.
    pub fn with_account(mut self, iban: impl Into<String>, name: impl Into<String>) -> Self {
        self.account_iban = Some(iban.into());
        self.account_name = Some(name.into());
        self
    }

    /// Set the SEPA BIC.
    pub fn with_account_bic(mut self, bic: impl Into<String>) -> Self {
        self.account_bic = Some(bic.into());
        self
    }

    /// Set the SEPA collect date.
    pub fn with_collect_date(mut self, date: NaiveDate) -> Self {
        self.collect_date = Some(date);
        self
    }

    /// Set the SEPA mandate reference.
    pub fn with_mandate_reference(mut self, reference: impl Into<String>) -> Self {
        self.mandate_reference = Some(reference.into());
        self
    }

    /// Set the SEPA mandate date.
    pub fn with_mandate_date(mut self, date: NaiveDate) -> Self {
        self.mandate_date = Some(date);
        self
    }

    /// Mark this transaction as the start of a recurring series.
    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Add a custom parameter.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.custom.insert(key, value);
        self
    }

    /// Add an additional parameter.
    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.additional.insert(key, value);
        self
    }

    /// Check required fields, the amount, the method and the issuer.
    pub fn validate(&self) -> Result<()> {
        require(&self.invoicenumber, "invoicenumber")?;

        match self.payment_method {
            PaymentMethod::SepaDirectDebit => {
                require_some(self.account_iban.as_deref(), "account_iban")?;
                require_some(self.account_name.as_deref(), "account_name")?;
            }
            method => {
                require_some(self.return_url.as_deref(), "return_url")?;
                if method.is_ideal() {
                    require_some(self.payment_issuer.as_deref(), "payment_issuer")?;
                }
            }
        }

        require_positive(&self.amount)?;
        require_method(self.payment_method, SETUP_METHODS)?;

        if self.payment_method.is_ideal() {
            let issuer = self.payment_issuer.as_deref().unwrap_or("");
            if !ideal::is_issuer(issuer) {
                return Err(BuckarooError::invalid_argument("payment issuer", issuer));
            }
        }

        Ok(())
    }
}

/// Options for a recurrent transaction on an earlier one.
#[derive(Clone, Debug)]
pub struct RecurrentTransactionOptions {
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Amount to pay.
    pub amount: Amount,
    /// Merchant invoice number.
    pub invoicenumber: String,
    /// Transaction key of the original transaction.
    pub transaction_id: String,
    /// Currency, `EUR` when absent.
    pub currency: Option<String>,
    /// Culture, Dutch when absent.
    pub culture: Option<Language>,
    /// Description.
    pub description: Option<String>,
    /// Client IP address.
    pub client_ip: Option<String>,
    /// Custom parameters.
    pub custom: ParameterSet,
    /// Additional parameters.
    pub additional: ParameterSet,
}

impl RecurrentTransactionOptions {
    /// Create options with the required fields.
    pub fn new(
        payment_method: PaymentMethod,
        amount: Amount,
        invoicenumber: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            payment_method,
            amount,
            invoicenumber: invoicenumber.into(),
            transaction_id: transaction_id.into(),
            currency: None,
            culture: None,
            description: None,
            client_ip: None,
            custom: ParameterSet::new(),
            additional: ParameterSet::new(),
        }
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the culture.
    pub fn with_culture(mut self, culture: Language) -> Self {
        self.culture = Some(culture);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the client IP address.
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    /// Add a custom parameter.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.custom.insert(key, value);
        self
    }

    /// Add an additional parameter.
    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.additional.insert(key, value);
        self
    }

    /// Check required fields, the amount and the method.
    pub fn validate(&self) -> Result<()> {
        require(&self.invoicenumber, "invoicenumber")?;
        require(&self.transaction_id, "transaction_id")?;
        require_positive(&self.amount)?;
        require_method(self.payment_method, RECURRENT_METHODS)
    }
}

/// Options for refunding a transaction.
///
/// Payment method, invoice number and currency are taken from the refund
/// information of the original transaction.
#[derive(Clone, Debug)]
pub struct RefundTransactionOptions {
    /// Transaction key to refund.
    pub transaction_id: String,
    /// Amount to refund, the maximum refundable amount when absent.
    pub amount: Option<Amount>,
    /// Custom parameters.
    pub custom: ParameterSet,
    /// Additional parameters.
    pub additional: ParameterSet,
}

impl RefundTransactionOptions {
    /// Refund `transaction_id`.
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: None,
            custom: ParameterSet::new(),
            additional: ParameterSet::new(),
        }
    }

    /// Refund only part of the transaction.
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Add a custom parameter.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.custom.insert(key, value);
        self
    }

    /// Check the transaction key and, if given, the amount.
    pub fn validate(&self) -> Result<()> {
        require(&self.transaction_id, "transaction_id")?;
        if let Some(amount) = &self.amount {
            require_positive(amount)?;
        }
        Ok(())
    }
}

/// Refund fields resolved from the refund information response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundDetails {
    /// Service code of the original payment.
    pub payment_method: String,
    /// Amount to credit.
    pub amount: Amount,
    /// Invoice number of the original payment.
    pub invoicenumber: String,
    /// Refund currency.
    pub currency: String,
}

/// Options for a status request. At least one key must be set.
#[derive(Clone, Debug, Default)]
pub struct StatusOptions {
    /// Transaction key.
    pub transaction_id: Option<String>,
    /// Payment key.
    pub payment_id: Option<String>,
}

impl StatusOptions {
    /// Look up by transaction key.
    pub fn transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            payment_id: None,
        }
    }

    /// Look up by payment key.
    pub fn payment(payment_id: impl Into<String>) -> Self {
        Self {
            transaction_id: None,
            payment_id: Some(payment_id.into()),
        }
    }

    /// Check that a key is present.
    pub fn validate(&self) -> Result<()> {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        if !present(&self.transaction_id) && !present(&self.payment_id) {
            return Err(BuckarooError::missing("transaction_id or payment_id"));
        }
        Ok(())
    }
}

/// Options for a transaction specification request.
#[derive(Clone, Debug, Default)]
pub struct TransactionSpecificationOptions {
    /// Services to describe, all when absent.
    pub payment_method: Option<PaymentMethodSelection>,
    /// Culture, Dutch when absent.
    pub culture: Option<Language>,
}

impl TransactionSpecificationOptions {
    /// Describe the given services.
    pub fn new(selection: impl Into<PaymentMethodSelection>) -> Self {
        Self {
            payment_method: Some(selection.into()),
            culture: None,
        }
    }

    /// Set the culture.
    pub fn with_culture(mut self, culture: Language) -> Self {
        self.culture = Some(culture);
        self
    }
}

/// A signed request ready to be sent.
#[derive(Clone, Debug)]
pub struct Request {
    operation: Operation,
    params: ParameterSet,
}

impl Request {
    /// The NVP operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The signed parameters, in transmission order.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Endpoint URL with the `op` query parameter set.
    pub fn url(&self, base: &str) -> Result<String> {
        let mut url = Url::parse(base)
            .map_err(|e| BuckarooError::invalid_config("api_url", format!("{} ({})", base, e)))?;
        url.set_query(Some(&format!("op={}", self.operation)));
        Ok(url.into())
    }

    /// Form-encoded request body.
    pub fn body(&self) -> String {
        codec::encode(&self.params)
    }
}

/// Builds signed requests for one website.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    website: String,
    signer: Signer,
}

impl RequestBuilder {
    /// Create a builder from configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            website: config.website.clone(),
            signer: Signer::from_config(config),
        }
    }

    /// New transaction request.
    pub fn setup_transaction(&self, options: &SetupTransactionOptions) -> Request {
        let mut params = transaction_params(
            options.payment_method,
            &options.amount,
            &options.invoicenumber,
            options.currency.as_deref(),
            options.culture,
        );

        match options.payment_method {
            method @ (PaymentMethod::Ideal | PaymentMethod::IdealProcessing) => {
                params.insert(service_key(method, "action"), Action::Pay.as_str());
                params.insert(
                    service_key(method, "issuer"),
                    ParamValue::from(options.payment_issuer.clone()),
                );
                params.insert(service_key(method, "version"), "2");
            }
            PaymentMethod::SepaDirectDebit => sepa_params(&mut params, options),
            _ => {}
        }

        if options.recurring {
            params.insert("brq_startrecurrent", true);
        }

        optional_transaction_params(
            &mut params,
            options.client_ip.as_deref(),
            options.description.as_deref(),
            options.return_url.as_deref(),
        );

        self.envelope(
            Operation::TransactionRequest,
            params,
            &options.custom,
            &options.additional,
        )
    }

    /// Recurrent transaction request.
    pub fn recurrent_transaction(&self, options: &RecurrentTransactionOptions) -> Request {
        let mut params = transaction_params(
            options.payment_method,
            &options.amount,
            &options.invoicenumber,
            options.currency.as_deref(),
            options.culture,
        );

        params.insert(
            service_key(options.payment_method, "action"),
            Action::PayRecurrent.as_str(),
        );
        // Without user redirection; required for recurrent payments.
        params.insert("brq_channel", "backoffice");
        params.insert("brq_originaltransaction", options.transaction_id.as_str());

        optional_transaction_params(
            &mut params,
            options.client_ip.as_deref(),
            options.description.as_deref(),
            None,
        );

        self.envelope(
            Operation::TransactionRequest,
            params,
            &options.custom,
            &options.additional,
        )
    }

    /// Refund request.
    pub fn refund_transaction(
        &self,
        options: &RefundTransactionOptions,
        details: &RefundDetails,
    ) -> Request {
        let mut params = ParameterSet::new();
        params.insert("brq_payment_method", details.payment_method.as_str());
        params.insert("brq_amount_credit", details.amount.to_string());
        params.insert("brq_currency", details.currency.as_str());
        params.insert("brq_invoicenumber", details.invoicenumber.as_str());
        params.insert(
            format!("brq_service_{}_action", details.payment_method),
            Action::Refund.as_str(),
        );
        params.insert("brq_originaltransaction", options.transaction_id.as_str());

        self.envelope(
            Operation::TransactionRequest,
            params,
            &options.custom,
            &options.additional,
        )
    }

    /// Refund information request.
    pub fn refund_info(&self, transaction_id: &str) -> Request {
        let mut params = ParameterSet::new();
        params.insert("brq_transaction", transaction_id);
        self.envelope(Operation::RefundInfo, params, &ParameterSet::new(), &ParameterSet::new())
    }

    /// Transaction status request.
    pub fn status(&self, options: &StatusOptions) -> Request {
        let mut params = ParameterSet::new();
        if let Some(transaction_id) = &options.transaction_id {
            params.insert("brq_transaction", transaction_id.as_str());
        }
        if let Some(payment_id) = &options.payment_id {
            params.insert("brq_payment", payment_id.as_str());
        }
        self.envelope(
            Operation::TransactionStatus,
            params,
            &ParameterSet::new(),
            &ParameterSet::new(),
        )
    }

    /// Cancel request.
    pub fn cancel(&self, transaction_id: &str) -> Request {
        let mut params = ParameterSet::new();
        params.insert("brq_transaction", transaction_id);
        self.envelope(
            Operation::CancelTransaction,
            params,
            &ParameterSet::new(),
            &ParameterSet::new(),
        )
    }

    /// Transaction specification request.
    pub fn specification(&self, options: &TransactionSpecificationOptions) -> Request {
        let mut params = ParameterSet::new();
        if let Some(selection) = &options.payment_method {
            params.insert("brq_services", selection.to_string());
        }
        params.insert("brq_latestversiononly", true);
        params.insert("brq_culture", options.culture.unwrap_or_default().as_str());

        self.envelope(
            Operation::TransactionRequestSpecification,
            params,
            &ParameterSet::new(),
            &ParameterSet::new(),
        )
    }

    fn envelope(
        &self,
        operation: Operation,
        request_params: ParameterSet,
        custom: &ParameterSet,
        additional: &ParameterSet,
    ) -> Request {
        let mut params = ParameterSet::new();
        params.insert("brq_websitekey", self.website.as_str());
        params.extend(request_params);

        for (key, value) in custom {
            params.insert(format!("cust_{}", key), value.clone());
        }
        for (key, value) in additional {
            params.insert(format!("add_{}", key), value.clone());
        }

        params.insert(
            CLIENT_KEY,
            format!("buckaroo-lib {}", env!("CARGO_PKG_VERSION")),
        );
        self.signer.append_signature(&mut params);

        Request { operation, params }
    }
}

fn service_key(method: PaymentMethod, field: &str) -> String {
    format!("brq_service_{}_{}", method, field)
}

fn transaction_params(
    payment_method: PaymentMethod,
    amount: &Amount,
    invoicenumber: &str,
    currency: Option<&str>,
    culture: Option<Language>,
) -> ParameterSet {
    let mut params = ParameterSet::new();
    params.insert("brq_payment_method", payment_method.as_str());
    params.insert("brq_culture", culture.unwrap_or_default().as_str());
    params.insert("brq_currency", currency.unwrap_or(DEFAULT_CURRENCY));
    params.insert("brq_amount", amount.to_string());
    params.insert("brq_invoicenumber", invoicenumber);
    params
}

fn optional_transaction_params(
    params: &mut ParameterSet,
    client_ip: Option<&str>,
    description: Option<&str>,
    return_url: Option<&str>,
) {
    if let Some(ip) = client_ip {
        params.insert("brq_clientip", ip);
    }
    if let Some(description) = description {
        params.insert("brq_description", description);
    }
    if let Some(url) = return_url {
        params.insert("brq_return", url);
    }
}

fn sepa_params(params: &mut ParameterSet, options: &SetupTransactionOptions) {
    let method = PaymentMethod::SepaDirectDebit;
    let iban: String = options
        .account_iban
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .collect();

    params.insert(service_key(method, "action"), Action::Pay.as_str());
    params.insert(service_key(method, "customeriban"), iban);
    params.insert(
        service_key(method, "customeraccountname"),
        ParamValue::from(options.account_name.clone()),
    );

    if let Some(bic) = &options.account_bic {
        params.insert(service_key(method, "customerbic"), bic.as_str());
    }

    if let Some(date) = options.collect_date {
        params.insert(
            service_key(method, "collectdate"),
            date.format("%Y-%m-%d").to_string(),
        );
    }

    if let Some(reference) = &options.mandate_reference {
        let mandate_date = options
            .mandate_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        params.insert(
            service_key(method, "action"),
            format!("{},{}", Action::Pay, Action::ExtraInfo),
        );
        params.insert(service_key(method, "mandatereference"), reference.as_str());
        params.insert(
            service_key(method, "mandatedate"),
            mandate_date.format("%Y-%m-%d").to_string(),
        );
    }
}
