//! Scalar text fields of a quotation and the record keys they travel under.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DocumentParts;

macro_rules! document_fields {
    ($($variant:ident => [$($key:literal),+ $(,)?]),+ $(,)?) => {
        /// A free-text field of a quotation.
        ///
        /// Each field has an editor key (the first entry of [`Self::keys`]) and
        /// may have further aliases used by the persistence layer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum DocumentField {
            $($variant),+
        }

        impl DocumentField {
            /// Every field, in form order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Record keys for this field, editor key first.
            #[must_use]
            pub const fn keys(self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($key),+]),+
                }
            }
        }
    };
}

document_fields! {
    QuotationNo => ["quotationNo"],
    PreparedBy => ["preparedBy"],
    ConsignorName => ["consignorName", "referenceName"],
    ConsignorAddress => ["consignorAddress", "consignerAddress"],
    ConsignorState => ["consignorState", "consignerState"],
    ConsignorStateCode => ["consignorStateCode", "consignerStateCode"],
    ConsignorGstin => ["consignorGSTIN", "consignerGstin"],
    ConsignorMobile => ["consignorMobile", "consignerMobile"],
    ConsignorPhone => ["consignorPhone", "consignerPhone"],
    ConsigneeName => ["consigneeName", "companyName"],
    ConsigneeAddress => ["consigneeAddress"],
    ShipTo => ["shipTo"],
    ConsigneeState => ["consigneeState"],
    ConsigneeStateCode => ["consigneeStateCode"],
    ConsigneeContactName => ["consigneeContactName", "contactName"],
    ConsigneeContactNo => ["consigneeContactNo", "contactNo"],
    ConsigneeGstin => ["consigneeGSTIN", "consigneeGstin"],
    MsmeNumber => ["msmeNumber", "msmeNo"],
    Validity => ["validity"],
    PaymentTerms => ["paymentTerms"],
    Delivery => ["delivery"],
    Freight => ["freight"],
    Insurance => ["insurance"],
    Taxes => ["taxes"],
    AccountNo => ["accountNo"],
    BankName => ["bankName"],
    BankAddress => ["bankAddress"],
    IfscCode => ["ifscCode"],
    Email => ["email"],
    Website => ["website"],
    Pan => ["pan"],
}

impl DocumentField {
    /// The editor key, e.g. `consigneeGSTIN`.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.keys().first().copied().unwrap_or_default()
    }

    /// Look a field up by any of its keys, case-insensitively.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.keys().iter().any(|k| k.eq_ignore_ascii_case(key)))
    }

    pub(crate) fn get(self, parts: &DocumentParts) -> &str {
        match self {
            Self::QuotationNo => &parts.quotation_no,
            Self::PreparedBy => &parts.prepared_by,
            Self::ConsignorName => &parts.consignor.name,
            Self::ConsignorAddress => &parts.consignor.address,
            Self::ConsignorState => &parts.consignor.state,
            Self::ConsignorStateCode => &parts.consignor.state_code,
            Self::ConsignorGstin => &parts.consignor.gstin,
            Self::ConsignorMobile => &parts.consignor.mobile,
            Self::ConsignorPhone => &parts.consignor.phone,
            Self::ConsigneeName => &parts.consignee.company_name,
            Self::ConsigneeAddress => &parts.consignee.address,
            Self::ShipTo => &parts.consignee.ship_to,
            Self::ConsigneeState => &parts.consignee.state,
            Self::ConsigneeStateCode => &parts.consignee.state_code,
            Self::ConsigneeContactName => &parts.consignee.contact_name,
            Self::ConsigneeContactNo => &parts.consignee.contact_no,
            Self::ConsigneeGstin => &parts.consignee.gstin,
            Self::MsmeNumber => &parts.consignee.msme_number,
            Self::Validity => &parts.terms.validity,
            Self::PaymentTerms => &parts.terms.payment_terms,
            Self::Delivery => &parts.terms.delivery,
            Self::Freight => &parts.terms.freight,
            Self::Insurance => &parts.terms.insurance,
            Self::Taxes => &parts.terms.taxes,
            Self::AccountNo => &parts.bank.account_no,
            Self::BankName => &parts.bank.bank_name,
            Self::BankAddress => &parts.bank.bank_address,
            Self::IfscCode => &parts.bank.ifsc_code,
            Self::Email => &parts.bank.email,
            Self::Website => &parts.bank.website,
            Self::Pan => &parts.bank.pan,
        }
    }

    pub(crate) fn slot(self, parts: &mut DocumentParts) -> &mut String {
        match self {
            Self::QuotationNo => &mut parts.quotation_no,
            Self::PreparedBy => &mut parts.prepared_by,
            Self::ConsignorName => &mut parts.consignor.name,
            Self::ConsignorAddress => &mut parts.consignor.address,
            Self::ConsignorState => &mut parts.consignor.state,
            Self::ConsignorStateCode => &mut parts.consignor.state_code,
            Self::ConsignorGstin => &mut parts.consignor.gstin,
            Self::ConsignorMobile => &mut parts.consignor.mobile,
            Self::ConsignorPhone => &mut parts.consignor.phone,
            Self::ConsigneeName => &mut parts.consignee.company_name,
            Self::ConsigneeAddress => &mut parts.consignee.address,
            Self::ShipTo => &mut parts.consignee.ship_to,
            Self::ConsigneeState => &mut parts.consignee.state,
            Self::ConsigneeStateCode => &mut parts.consignee.state_code,
            Self::ConsigneeContactName => &mut parts.consignee.contact_name,
            Self::ConsigneeContactNo => &mut parts.consignee.contact_no,
            Self::ConsigneeGstin => &mut parts.consignee.gstin,
            Self::MsmeNumber => &mut parts.consignee.msme_number,
            Self::Validity => &mut parts.terms.validity,
            Self::PaymentTerms => &mut parts.terms.payment_terms,
            Self::Delivery => &mut parts.terms.delivery,
            Self::Freight => &mut parts.terms.freight,
            Self::Insurance => &mut parts.terms.insurance,
            Self::Taxes => &mut parts.terms.taxes,
            Self::AccountNo => &mut parts.bank.account_no,
            Self::BankName => &mut parts.bank.bank_name,
            Self::BankAddress => &mut parts.bank.bank_address,
            Self::IfscCode => &mut parts.bank.ifsc_code,
            Self::Email => &mut parts.bank.email,
            Self::Website => &mut parts.bank.website,
            Self::Pan => &mut parts.bank.pan,
        }
    }
}

impl fmt::Display for DocumentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DocumentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown quotation field: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_accepts_aliases() {
        assert_eq!(
            DocumentField::from_key("consigneeGSTIN"),
            Some(DocumentField::ConsigneeGstin)
        );
        assert_eq!(
            DocumentField::from_key("consigneegstin"),
            Some(DocumentField::ConsigneeGstin)
        );
        assert_eq!(
            DocumentField::from_key("referenceName"),
            Some(DocumentField::ConsignorName)
        );
        assert_eq!(DocumentField::from_key("grandTotal"), None);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for field in DocumentField::ALL {
            for key in field.keys() {
                assert!(seen.insert(key.to_ascii_lowercase()), "duplicate key {key}");
            }
        }
    }

    #[test]
    fn test_slot_round_trip() {
        let mut parts = DocumentParts::default();
        for (i, field) in DocumentField::ALL.iter().enumerate() {
            *field.slot(&mut parts) = format!("value-{i}");
        }
        for (i, field) in DocumentField::ALL.iter().enumerate() {
            assert_eq!(field.get(&parts), format!("value-{i}"));
        }
    }

    #[test]
    fn test_display_uses_editor_key() {
        assert_eq!(DocumentField::MsmeNumber.to_string(), "msmeNumber");
    }
}
