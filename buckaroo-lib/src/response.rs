//! Parsed and verified gateway responses.
//!
//! Every response body is decoded, then its signature is checked. Responses
//! to API calls fail with [`BuckarooError::Api`] when the result is absent or
//! `Fail`. The gateway does not sign `Fail` results, so on the API path those
//! become [`BuckarooError::Api`] without verification. Push notifications are
//! always verified.

use std::ops::Deref;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::amount::Amount;
use crate::classify::{classify_status, classify_type, TransactionStatus, TransactionType};
use crate::codec;
use crate::field_mapper::{map_fields, IndexedGroup};
use crate::params::{starts_with_ignore_case, ResponseParams};
use crate::payment_method::PaymentMethod;
use crate::signature::Signer;
use crate::{BuckarooError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A decoded response whose signature policy has been applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    params: ResponseParams,
}

impl Response {
    /// Decode a form-encoded body and verify its signature.
    pub fn parse(body: &[u8], signer: &Signer) -> Result<Self> {
        Self::from_params(codec::decode(body), signer)
    }

    /// Decode the body of an API call and require a successful result.
    pub fn parse_api(body: &[u8], signer: &Signer) -> Result<Self> {
        Self::from_api_params(codec::decode(body), signer)
    }

    /// Verify already decoded parameters. A valid signature is required.
    pub fn from_params(params: ResponseParams, signer: &Signer) -> Result<Self> {
        tracing::debug!(keys = ?params.keys().collect::<Vec<_>>(), "response parameters received");
        signer.verify(&params)?;
        Ok(Self { params })
    }

    /// Check already decoded parameters of an API call.
    ///
    /// An unsigned `Fail` result is turned into [`BuckarooError::Api`]
    /// without verification; it is never returned as a response.
    pub fn from_api_params(params: ResponseParams, signer: &Signer) -> Result<Self> {
        if is_fail(params.get_str("brq_apiresult")) {
            tracing::debug!("failed API result, signature not checked");
            return Self { params }.into_api();
        }
        Self::from_params(params, signer)?.into_api()
    }

    /// Require a successful `brq_apiresult`.
    pub fn into_api(self) -> Result<Self> {
        let result = self.api_result();
        if result.is_none() || is_fail(result) {
            tracing::warn!(
                result = result.unwrap_or(""),
                status_code = self.params.get_str("brq_statuscode").unwrap_or(""),
                "gateway reported a failed API call"
            );
            return Err(BuckarooError::Api {
                status_code: self.params.get_str("brq_statuscode").map(str::to_owned),
                status_message: self.params.get_str("brq_statusmessage").map(str::to_owned),
                error_message: self.params.get_str("brq_apierrormessage").map(str::to_owned),
            });
        }
        Ok(self)
    }

    /// All response parameters.
    pub fn params(&self) -> &ResponseParams {
        &self.params
    }

    /// Value of a single parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get_str(key)
    }

    /// `brq_apiresult`
    pub fn api_result(&self) -> Option<&str> {
        self.get("brq_apiresult")
    }

    /// Status classified from `brq_statuscode`.
    pub fn status(&self) -> Option<TransactionStatus> {
        self.get("brq_statuscode").and_then(classify_status)
    }

    /// `brq_timestamp`, if present and well formed.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.params)
    }

    /// `cust_*` parameters with the prefix stripped.
    pub fn custom(&self) -> ResponseParams {
        strip_prefix(&self.params, "cust_")
    }

    /// `add_*` parameters with the prefix stripped.
    pub fn additional(&self) -> ResponseParams {
        strip_prefix(&self.params, "add_")
    }
}

fn is_fail(result: Option<&str>) -> bool {
    result.is_some_and(|r| r.eq_ignore_ascii_case("fail"))
}

fn strip_prefix(params: &ResponseParams, prefix: &str) -> ResponseParams {
    params
        .iter()
        .filter(|(key, _)| starts_with_ignore_case(key, prefix))
        .map(|(key, value)| (&key[prefix.len()..], value.as_str()))
        .collect()
}

fn parse_timestamp(params: &ResponseParams) -> Option<NaiveDateTime> {
    let raw = params.get_str("brq_timestamp")?;
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| tracing::debug!(timestamp = raw, error = %e, "unparseable timestamp"))
        .ok()
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| tracing::debug!(date = raw, error = %e, "unparseable date"))
        .ok()
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Flattened view of a transaction response, omitting absent fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransactionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoicenumber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandate_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reversal_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<TransactionStatus>,
}

/// Accessors shared by every response describing a transaction.
pub trait TransactionResponse {
    /// Underlying parameters.
    fn params(&self) -> &ResponseParams;

    /// Payment method service code, lowercased.
    fn payment_method(&self) -> Option<String> {
        let params = self.params();
        params
            .get_str("brq_payment_method")
            .or_else(|| params.get_str("brq_transaction_method"))
            .map(str::to_lowercase)
    }

    /// Payment method, if it is one this crate knows.
    fn payment_method_kind(&self) -> Option<PaymentMethod> {
        self.payment_method()?.parse().ok()
    }

    /// Consumer BIC (iDEAL and SEPA only).
    fn account_bic(&self) -> Option<&str> {
        match self.payment_method_kind()? {
            m @ (PaymentMethod::Ideal | PaymentMethod::IdealProcessing) => self
                .params()
                .get_str(&format!("brq_service_{}_consumerbic", m)),
            PaymentMethod::SepaDirectDebit => self
                .params()
                .get_str("brq_service_sepadirectdebit_customerbic"),
            _ => None,
        }
    }

    /// Consumer IBAN (iDEAL and SEPA only).
    fn account_iban(&self) -> Option<&str> {
        match self.payment_method_kind()? {
            m @ (PaymentMethod::Ideal | PaymentMethod::IdealProcessing) => self
                .params()
                .get_str(&format!("brq_service_{}_consumeriban", m)),
            PaymentMethod::SepaDirectDebit => self
                .params()
                .get_str("brq_service_sepadirectdebit_customeriban"),
            _ => None,
        }
    }

    /// Account holder name, falling back to `brq_customer_name`.
    fn account_name(&self) -> Option<&str> {
        let params = self.params();
        let specific = match self.payment_method_kind()? {
            m @ (PaymentMethod::Ideal | PaymentMethod::IdealProcessing) => {
                params.get_str(&format!("brq_service_{}_consumername", m))
            }
            PaymentMethod::SepaDirectDebit => {
                params.get_str("brq_service_sepadirectdebit_customername")
            }
            _ => return None,
        };
        specific.or_else(|| params.get_str("brq_customer_name"))
    }

    /// SEPA collect date.
    fn collect_date(&self) -> Option<NaiveDate> {
        if self.payment_method_kind()? != PaymentMethod::SepaDirectDebit {
            return None;
        }
        parse_date(self.params().get_str("brq_service_sepadirectdebit_collectdate"))
    }

    /// SEPA mandate reference.
    fn mandate_reference(&self) -> Option<&str> {
        if self.payment_method_kind()? != PaymentMethod::SepaDirectDebit {
            return None;
        }
        self.params()
            .get_str("brq_service_sepadirectdebit_mandatereference")
    }

    fn invoicenumber(&self) -> Option<&str> {
        self.params().get_str("brq_invoicenumber")
    }

    fn payment_id(&self) -> Option<&str> {
        self.params().get_str("brq_payment")
    }

    fn redirect_url(&self) -> Option<&str> {
        self.params().get_str("brq_redirecturl")
    }

    fn refund_transaction_id(&self) -> Option<&str> {
        self.params().get_str("brq_relatedtransaction_refund")
    }

    fn reversal_transaction_id(&self) -> Option<&str> {
        self.params().get_str("brq_relatedtransaction_reversal")
    }

    /// Transaction key (`brq_transactions`).
    fn transaction_id(&self) -> Option<&str> {
        self.params().get_str("brq_transactions")
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(self.params())
    }

    /// Type classified from `brq_transaction_type` and `brq_recurring`.
    fn transaction_type(&self) -> Option<TransactionType> {
        let params = self.params();
        classify_type(
            params.get_str("brq_transaction_type"),
            params.get_str("brq_recurring"),
        )
    }

    /// Status classified from `brq_statuscode`.
    fn transaction_status(&self) -> Option<TransactionStatus> {
        self.params()
            .get_str("brq_statuscode")
            .and_then(classify_status)
    }

    /// All accessors at once.
    fn summary(&self) -> TransactionSummary {
        TransactionSummary {
            account_bic: self.account_bic().map(str::to_owned),
            account_iban: self.account_iban().map(str::to_owned),
            account_name: self.account_name().map(str::to_owned),
            collect_date: self.collect_date(),
            invoicenumber: self.invoicenumber().map(str::to_owned),
            mandate_reference: self.mandate_reference().map(str::to_owned),
            payment_id: self.payment_id().map(str::to_owned),
            payment_method: self.payment_method(),
            refund_transaction_id: self.refund_transaction_id().map(str::to_owned),
            reversal_transaction_id: self.reversal_transaction_id().map(str::to_owned),
            timestamp: self.timestamp(),
            transaction_id: self.transaction_id().map(str::to_owned),
            transaction_type: self.transaction_type(),
            transaction_status: self.transaction_status(),
        }
    }
}

macro_rules! typed_response {
    (@transaction $name:ident, true) => {
        impl TransactionResponse for $name {
            fn params(&self) -> &ResponseParams {
                self.0.params()
            }
        }
    };
    (@transaction $name:ident, false) => {};
    ($(#[$meta:meta])* $name:ident, api = $api:expr, transaction = $transaction:tt) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name(Response);

        impl $name {
            /// Decode and verify a response body.
            pub fn parse(body: &[u8], signer: &Signer) -> Result<Self> {
                let response = if $api {
                    Response::parse_api(body, signer)?
                } else {
                    Response::parse(body, signer)?
                };
                Self::from_response(response)
            }

            /// Wrap a verified response.
            pub fn from_response(response: Response) -> Result<Self> {
                if $api {
                    response.into_api().map(Self)
                } else {
                    Ok(Self(response))
                }
            }
        }

        impl Deref for $name {
            type Target = Response;

            fn deref(&self) -> &Response {
                &self.0
            }
        }

        typed_response!(@transaction $name, $transaction);
    };
}

typed_response!(
    /// Response to a new transaction.
    SetupTransactionResponse, api = true, transaction = true
);

typed_response!(
    /// Response to a recurrent transaction.
    RecurrentTransactionResponse, api = true, transaction = true
);

typed_response!(
    /// Response to a refund.
    RefundTransactionResponse, api = true, transaction = true
);

typed_response!(
    /// Refund information of a transaction.
    RefundInfoResponse, api = true, transaction = false
);

typed_response!(
    /// Status of a transaction.
    StatusResponse, api = true, transaction = true
);

typed_response!(
    /// Response to a cancellation.
    CancelResponse, api = true, transaction = false
);

typed_response!(
    /// Push notification sent by the gateway.
    CallbackResponse, api = false, transaction = true
);

typed_response!(
    /// Field specification of one or more services.
    TransactionSpecificationResponse, api = true, transaction = false
);

impl RefundInfoResponse {
    /// Service code of the original payment.
    pub fn payment_method(&self) -> Option<&str> {
        self.get("brq_refundinfo_1_servicecode")
    }

    pub fn is_refundable(&self) -> bool {
        is_true(self.get("brq_refundinfo_1_isrefundable"))
    }

    /// Maximum refundable amount, if present and numeric.
    pub fn maximum_amount(&self) -> Option<Amount> {
        self.get("brq_refundinfo_1_maximumrefundamount")?.parse().ok()
    }

    pub fn invoicenumber(&self) -> Option<&str> {
        self.get("brq_refundinfo_1_invoice")
    }

    pub fn currency(&self) -> Option<&str> {
        self.get("brq_refundinfo_1_refundcurrency")
    }
}

impl StatusResponse {
    pub fn is_cancellable(&self) -> bool {
        is_true(self.get("brq_transaction_cancelable"))
    }
}

impl TransactionSpecificationResponse {
    /// Service descriptions grouped from `brq_services_N_*`.
    pub fn services(&self) -> Vec<IndexedGroup> {
        map_fields(self.params(), "brq_services")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use crate::signature::HashMethod;
    use crate::BuckarooErrorCode;

    fn signer() -> Signer {
        Signer::new("secret", HashMethod::Sha1)
    }

    fn signed(pairs: &[(&str, &str)]) -> Vec<u8> {
        let mut params: ParameterSet = pairs.iter().copied().collect();
        signer().append_signature(&mut params);
        codec::encode_to_bytes(&params)
    }

    #[test]
    fn test_signed_response_accepted() {
        let body = signed(&[("brq_apiresult", "Success"), ("brq_statuscode", "190")]);
        let response = Response::parse(&body, &signer()).unwrap();

        assert_eq!(response.api_result(), Some("Success"));
        assert_eq!(response.status(), Some(TransactionStatus::Success));
    }

    #[test]
    fn test_tampered_response_rejected() {
        let mut body = signed(&[("brq_statuscode", "190"), ("brq_amount", "10.00")]);
        let text = String::from_utf8(body).unwrap().replace("10.00", "99.00");
        body = text.into_bytes();

        let err = Response::parse(&body, &signer()).unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::SignatureMismatch);
    }

    #[test]
    fn test_missing_signature_rejected() {
        let err = Response::parse(b"brq_statuscode=190", &signer()).unwrap_err();
        match err {
            BuckarooError::SignatureMismatch { sent, .. } => assert!(sent.is_none()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsigned_fail_is_api_error() {
        let body = b"brq_apiresult=fail&brq_apierrormessage=Invalid+website";
        let err = Response::parse_api(body, &signer()).unwrap_err();
        assert_eq!(err.to_string(), "API request failed: Invalid website");

        let err = StatusResponse::parse(body, &signer()).unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::Api);
    }

    #[test]
    fn test_unsigned_fail_callback_rejected() {
        let body = b"brq_apiresult=Fail&brq_statuscode=190\
            &brq_transactions=41C48B55FA9164E123CC73B1157459E840BE5D24&brq_signature=garbage";

        let err = CallbackResponse::parse(body, &signer()).unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::SignatureMismatch);

        let err = Response::parse(b"brq_apiresult=Fail&brq_statuscode=190", &signer()).unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::SignatureMismatch);
    }

    #[test]
    fn test_signed_fail_is_api_error() {
        let body = signed(&[("brq_apiresult", "Fail"), ("brq_statuscode", "490")]);
        let err = Response::parse_api(&body, &signer()).unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::Api);
    }

    #[test]
    fn test_api_result_required() {
        let body = signed(&[("brq_statuscode", "190")]);
        let err = StatusResponse::parse(&body, &signer()).unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::Api);

        // callbacks carry no api result
        assert!(CallbackResponse::parse(&body, &signer()).is_ok());
    }

    #[test]
    fn test_custom_and_additional() {
        let body = signed(&[
            ("brq_apiresult", "Success"),
            ("CUST_foo", "bar"),
            ("add_myreference", "12345"),
        ]);
        let response = Response::parse(&body, &signer()).unwrap();

        assert_eq!(response.custom().get_str("foo"), Some("bar"));
        assert_eq!(response.custom().len(), 1);
        assert_eq!(response.additional().get_str("MYREFERENCE"), Some("12345"));
    }

    #[test]
    fn test_timestamp() {
        let body = signed(&[("brq_timestamp", "2014-11-05 13:10:42")]);
        let response = Response::parse(&body, &signer()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2014, 11, 5)
            .unwrap()
            .and_hms_opt(13, 10, 42)
            .unwrap();
        assert_eq!(response.timestamp(), Some(expected));

        let body = signed(&[("brq_timestamp", "yesterday")]);
        assert_eq!(Response::parse(&body, &signer()).unwrap().timestamp(), None);
    }

    #[test]
    fn test_ideal_transaction_accessors() {
        let body = signed(&[
            ("brq_apiresult", "ActionRequired"),
            ("brq_payment_method", "IDEAL"),
            ("brq_service_ideal_consumerbic", "RABONL2U"),
            ("brq_service_ideal_consumeriban", "NL44RABO0123456789"),
            ("brq_customer_name", "J. de Tester"),
            ("brq_invoicenumber", "12345"),
            ("brq_payment", "E86256B2787EE7FF0C33D0D4BBC2A65F"),
            ("brq_redirecturl", "https://checkout.buckaroo.nl/html/redirect.ashx"),
            ("brq_statuscode", "791"),
            ("brq_transactions", "41C48B55FA9164E123CC73B1157459E840BE5D24"),
        ]);
        let response = SetupTransactionResponse::parse(&body, &signer()).unwrap();

        assert_eq!(response.payment_method().as_deref(), Some("ideal"));
        assert_eq!(response.account_bic(), Some("RABONL2U"));
        assert_eq!(response.account_iban(), Some("NL44RABO0123456789"));
        assert_eq!(response.account_name(), Some("J. de Tester"));
        assert_eq!(response.collect_date(), None);
        assert_eq!(response.mandate_reference(), None);
        assert_eq!(
            response.redirect_url(),
            Some("https://checkout.buckaroo.nl/html/redirect.ashx")
        );
        assert_eq!(response.transaction_status(), Some(TransactionStatus::Pending));
        assert_eq!(response.transaction_type(), Some(TransactionType::Payment));

        let summary = response.summary();
        assert_eq!(
            summary.transaction_id.as_deref(),
            Some("41C48B55FA9164E123CC73B1157459E840BE5D24")
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["transaction_status"], "pending");
        assert!(json.get("collect_date").is_none());
    }

    #[test]
    fn test_sepa_transaction_accessors() {
        let body = signed(&[
            ("brq_transaction_method", "SepaDirectDebit"),
            ("brq_service_sepadirectdebit_customername", "J. Tester"),
            ("brq_service_sepadirectdebit_collectdate", "2016-01-15"),
            ("brq_service_sepadirectdebit_mandatereference", "00P12345"),
            ("brq_transaction_type", "C004"),
            ("brq_recurring", "True"),
        ]);
        let response = CallbackResponse::parse(&body, &signer()).unwrap();

        assert_eq!(response.account_name(), Some("J. Tester"));
        assert_eq!(response.collect_date(), NaiveDate::from_ymd_opt(2016, 1, 15));
        assert_eq!(response.mandate_reference(), Some("00P12345"));
        assert_eq!(
            response.transaction_type(),
            Some(TransactionType::PaymentRecurrent)
        );
    }

    #[test]
    fn test_unknown_method_has_no_account() {
        let body = signed(&[("brq_payment_method", "visa"), ("brq_customer_name", "X")]);
        let response = CallbackResponse::parse(&body, &signer()).unwrap();
        assert_eq!(response.account_name(), None);
        assert_eq!(response.account_bic(), None);
    }

    #[test]
    fn test_refund_info() {
        let body = signed(&[
            ("brq_apiresult", "Success"),
            ("brq_refundinfo_1_servicecode", "ideal"),
            ("brq_refundinfo_1_isrefundable", "True"),
            ("brq_refundinfo_1_maximumrefundamount", "10.5"),
            ("brq_refundinfo_1_invoice", "12345"),
            ("brq_refundinfo_1_refundcurrency", "EUR"),
        ]);
        let info = RefundInfoResponse::parse(&body, &signer()).unwrap();

        assert!(info.is_refundable());
        assert_eq!(info.payment_method(), Some("ideal"));
        assert_eq!(info.maximum_amount().unwrap().to_string(), "10.50");
        assert_eq!(info.invoicenumber(), Some("12345"));
        assert_eq!(info.currency(), Some("EUR"));
    }

    #[test]
    fn test_cancellable() {
        let body = signed(&[("brq_apiresult", "Success"), ("brq_transaction_cancelable", "TRUE")]);
        assert!(StatusResponse::parse(&body, &signer()).unwrap().is_cancellable());

        let body = signed(&[("brq_apiresult", "Success")]);
        assert!(!StatusResponse::parse(&body, &signer()).unwrap().is_cancellable());
    }

    #[test]
    fn test_specification_services() {
        let body = signed(&[
            ("brq_apiresult", "Success"),
            ("brq_services_1_name", "ideal"),
            ("brq_services_1_version", "2"),
            ("brq_services_2_name", "visa"),
        ]);
        let response = TransactionSpecificationResponse::parse(&body, &signer()).unwrap();
        let services = response.services();

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].get("name").and_then(|v| v.as_str()), Some("ideal"));
        assert_eq!(services[1].get("name").and_then(|v| v.as_str()), Some("visa"));
    }
}
