//! pain.001.001.09 XML rendering
//!
//! Serde-mapped element structs rendered with quick-xml. The message
//! carries a supplementary data block with the M2 coverage snapshot and
//! the evidence attestations.
//!
//! # Example Output
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.001.001.09">
//!   <CstmrCdtTrfInitn>
//!     <GrpHdr>
//!       <MsgId>PAIN.001.TXN_1700000000_ABCDEFG</MsgId>
//!       ...
//!     </GrpHdr>
//!     <PmtInf>...</PmtInf>
//!     <SplmtryData>...</SplmtryData>
//!   </CstmrCdtTrfInitn>
//! </Document>
//! ```

use crate::{instruction::PaymentInstruction, Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::se::to_string as to_xml_string;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const NAMESPACE_PAIN001: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.09";

/// pain.001 XML generator
pub struct Pain001Generator {
    /// Output directory for exported messages
    output_dir: PathBuf,
}

impl Pain001Generator {
    /// Create new generator
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Render an instruction to a pain.001 XML string
    pub fn render(&self, instruction: &PaymentInstruction) -> Result<String> {
        let document = build_document(instruction);
        let xml = to_xml_string(&document)
            .map_err(|e| Error::Xml(format!("XML serialization failed: {}", e)))?;

        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
            xml
        ))
    }

    /// Render and write `ISO20022_<message_id>.xml` into the output dir
    pub fn export(&self, instruction: &PaymentInstruction) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let xml = self.render(instruction)?;
        let filename = format!("ISO20022_{}.xml", instruction.message_id);
        let filepath = self.output_dir.join(&filename);
        std::fs::write(&filepath, xml)?;

        tracing::info!("Exported ISO 20022 file: {}", filename);
        Ok(filepath)
    }
}

fn build_document(instruction: &PaymentInstruction) -> Pain001Document {
    Pain001Document {
        xmlns: NAMESPACE_PAIN001.to_string(),
        cstmr_cdt_trf_initn: CstmrCdtTrfInitn {
            grp_hdr: GroupHeader {
                msg_id: instruction.message_id.clone(),
                cre_dt_tm: instruction.creation_date_time,
                nb_of_txs: instruction.number_of_transactions,
                ctrl_sum: instruction.control_sum,
                initg_pty: InitgPty {
                    nm: instruction.initiating_party.name.clone(),
                    id: PartyId {
                        org_id: OrgId {
                            bic_or_bei: instruction.initiating_party.identification.clone(),
                        },
                    },
                },
            },
            pmt_inf: PaymentInfo {
                pmt_inf_id: instruction.payment_information_id.clone(),
                pmt_mtd: instruction.payment_method.clone(),
                reqd_exctn_dt: RequestedExecutionDate {
                    dt: instruction.requested_execution_date,
                },
                dbtr: Name {
                    nm: instruction.debtor.name.clone(),
                },
                dbtr_acct: DebtorAccount {
                    id: AccountOther {
                        othr: OtherId {
                            id: instruction.debtor.account_number.clone(),
                        },
                    },
                    ccy: instruction.debtor.currency.clone(),
                },
                dbtr_agt: FinInstn {
                    fin_instn_id: FinInstnId {
                        bicfi: instruction.debtor_agent.bicfi.clone(),
                        nm: instruction.debtor_agent.name.clone(),
                    },
                },
                cdt_trf_tx_inf: instruction
                    .transactions
                    .iter()
                    .map(|tx| CdtTrfTxInf {
                        pmt_id: PmtId {
                            end_to_end_id: tx.payment_id.clone(),
                        },
                        amt: Amount {
                            instd_amt: InstdAmt {
                                ccy: tx.currency.clone(),
                                value: tx.amount,
                            },
                        },
                        cdtr_agt: FinInstn {
                            fin_instn_id: FinInstnId {
                                bicfi: tx.creditor_agent.bicfi.clone(),
                                nm: tx.creditor_agent.name.clone(),
                            },
                        },
                        cdtr: Name {
                            nm: tx.creditor.name.clone(),
                        },
                        cdtr_acct: CreditorAccount {
                            id: AccountOther {
                                othr: OtherId {
                                    id: tx.creditor.account_number.clone(),
                                },
                            },
                        },
                        rmt_inf: RmtInf {
                            ustrd: tx.remittance_info.clone(),
                        },
                        purp: Purpose {
                            cd: tx.purpose_code.clone(),
                        },
                    })
                    .collect(),
            },
            splmtry_data: SupplementaryData {
                plc_and_nm: "M2_COVERAGE".to_string(),
                envlp: Envelope {
                    m2_validation: M2Validation {
                        source_file: instruction.coverage.source_file.clone(),
                        total_balance: instruction.coverage.total_balance,
                        currency: instruction.coverage.currency.clone(),
                        extracted_at: instruction.coverage.extracted_at,
                        verified: instruction.coverage.verified,
                        attestations: Attestations {
                            attestation: instruction
                                .attestations
                                .iter()
                                .map(|a| AttestationXml {
                                    signature_value: a.signature.clone(),
                                    signature_method: a.method.clone(),
                                    digest_value: a.digest_value.clone(),
                                    attestor: a.attestor.clone(),
                                    serial_number: a.serial.clone(),
                                    signed_at: a.signed_at,
                                    verified: a.verified,
                                    source: SourceXml {
                                        file_hash: a.source.file_hash.clone(),
                                        block_hash: a.source.block_hash.clone(),
                                        offset: a.source.offset,
                                    },
                                })
                                .collect(),
                        },
                    },
                },
            },
        },
    }
}

// pain.001 element structures

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Document")]
struct Pain001Document {
    #[serde(rename = "@xmlns")]
    xmlns: String,

    #[serde(rename = "CstmrCdtTrfInitn")]
    cstmr_cdt_trf_initn: CstmrCdtTrfInitn,
}

#[derive(Debug, Serialize, Deserialize)]
struct CstmrCdtTrfInitn {
    #[serde(rename = "GrpHdr")]
    grp_hdr: GroupHeader,

    #[serde(rename = "PmtInf")]
    pmt_inf: PaymentInfo,

    #[serde(rename = "SplmtryData")]
    splmtry_data: SupplementaryData,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupHeader {
    #[serde(rename = "MsgId")]
    msg_id: String,

    #[serde(rename = "CreDtTm")]
    cre_dt_tm: DateTime<Utc>,

    #[serde(rename = "NbOfTxs")]
    nb_of_txs: u32,

    #[serde(rename = "CtrlSum")]
    ctrl_sum: Decimal,

    #[serde(rename = "InitgPty")]
    initg_pty: InitgPty,
}

#[derive(Debug, Serialize, Deserialize)]
struct InitgPty {
    #[serde(rename = "Nm")]
    nm: String,

    #[serde(rename = "Id")]
    id: PartyId,
}

#[derive(Debug, Serialize, Deserialize)]
struct PartyId {
    #[serde(rename = "OrgId")]
    org_id: OrgId,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrgId {
    #[serde(rename = "BICOrBEI")]
    bic_or_bei: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaymentInfo {
    #[serde(rename = "PmtInfId")]
    pmt_inf_id: String,

    #[serde(rename = "PmtMtd")]
    pmt_mtd: String,

    #[serde(rename = "ReqdExctnDt")]
    reqd_exctn_dt: RequestedExecutionDate,

    #[serde(rename = "Dbtr")]
    dbtr: Name,

    #[serde(rename = "DbtrAcct")]
    dbtr_acct: DebtorAccount,

    #[serde(rename = "DbtrAgt")]
    dbtr_agt: FinInstn,

    #[serde(rename = "CdtTrfTxInf")]
    cdt_trf_tx_inf: Vec<CdtTrfTxInf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RequestedExecutionDate {
    #[serde(rename = "Dt")]
    dt: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
struct Name {
    #[serde(rename = "Nm")]
    nm: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DebtorAccount {
    #[serde(rename = "Id")]
    id: AccountOther,

    #[serde(rename = "Ccy")]
    ccy: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreditorAccount {
    #[serde(rename = "Id")]
    id: AccountOther,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountOther {
    #[serde(rename = "Othr")]
    othr: OtherId,
}

#[derive(Debug, Serialize, Deserialize)]
struct OtherId {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FinInstn {
    #[serde(rename = "FinInstnId")]
    fin_instn_id: FinInstnId,
}

#[derive(Debug, Serialize, Deserialize)]
struct FinInstnId {
    #[serde(rename = "BICFI")]
    bicfi: String,

    #[serde(rename = "Nm")]
    nm: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CdtTrfTxInf {
    #[serde(rename = "PmtId")]
    pmt_id: PmtId,

    #[serde(rename = "Amt")]
    amt: Amount,

    #[serde(rename = "CdtrAgt")]
    cdtr_agt: FinInstn,

    #[serde(rename = "Cdtr")]
    cdtr: Name,

    #[serde(rename = "CdtrAcct")]
    cdtr_acct: CreditorAccount,

    #[serde(rename = "RmtInf")]
    rmt_inf: RmtInf,

    #[serde(rename = "Purp")]
    purp: Purpose,
}

#[derive(Debug, Serialize, Deserialize)]
struct PmtId {
    #[serde(rename = "EndToEndId")]
    end_to_end_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Amount {
    #[serde(rename = "InstdAmt")]
    instd_amt: InstdAmt,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstdAmt {
    #[serde(rename = "@Ccy")]
    ccy: String,

    #[serde(rename = "$text")]
    value: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct RmtInf {
    #[serde(rename = "Ustrd")]
    ustrd: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Purpose {
    #[serde(rename = "Cd")]
    cd: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SupplementaryData {
    #[serde(rename = "PlcAndNm")]
    plc_and_nm: String,

    #[serde(rename = "Envlp")]
    envlp: Envelope,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "M2Validation")]
    m2_validation: M2Validation,
}

#[derive(Debug, Serialize, Deserialize)]
struct M2Validation {
    #[serde(rename = "SourceFile")]
    source_file: String,

    #[serde(rename = "TotalBalance")]
    total_balance: Decimal,

    #[serde(rename = "Currency")]
    currency: String,

    #[serde(rename = "ExtractedAt")]
    extracted_at: DateTime<Utc>,

    #[serde(rename = "Verified")]
    verified: bool,

    #[serde(rename = "Attestations")]
    attestations: Attestations,
}

#[derive(Debug, Serialize, Deserialize)]
struct Attestations {
    #[serde(rename = "Attestation")]
    attestation: Vec<AttestationXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AttestationXml {
    #[serde(rename = "SignatureValue")]
    signature_value: String,

    #[serde(rename = "SignatureMethod")]
    signature_method: String,

    #[serde(rename = "DigestValue")]
    digest_value: String,

    #[serde(rename = "Attestor")]
    attestor: String,

    #[serde(rename = "SerialNumber")]
    serial_number: String,

    #[serde(rename = "SignedAt")]
    signed_at: DateTime<Utc>,

    #[serde(rename = "Verified")]
    verified: bool,

    #[serde(rename = "Source")]
    source: SourceXml,
}

#[derive(Debug, Serialize, Deserialize)]
struct SourceXml {
    #[serde(rename = "FileHash")]
    file_hash: String,

    #[serde(rename = "BlockHash")]
    block_hash: String,

    #[serde(rename = "Offset")]
    offset: u64,
}
