//! Decoders for each supported record kind.
//!
//! Each decoder reads its fields in layout order from a [`Payload`] and must
//! leave no payload bytes unread. `C*n` fields at the end of a payload are
//! kept whole, length byte included; runs of `C*n` fields are decoded as a
//! delimited text bundle (see [`decode_bundle`]).

use tartan_bitfield::bitfield;

use super::{
    field::{DecodeError, Payload, decode_bundle, text},
    record::{DecodedRecord, FieldValue},
};

const MIR_TEXT: [&str; 30] = [
    "LOT_ID", "PART_TYP", "NODE_NAM", "TSTR_TYP", "JOB_NAM", "JOB_REV", "SBLOT_ID", "OPER_NAM",
    "EXEC_TYP", "EXEC_VER", "TEST_COD", "TST_TEMP", "USER_TXT", "AUX_FILE", "PKG_TYP", "FAMLY_ID",
    "DATE_COD", "FACIL_ID", "FLOOR_ID", "PROC_ID", "OPER_FRQ", "SPEC_NAM", "SPEC_VER", "FLOW_ID",
    "SETUP_ID", "DSGN_REV", "ENG_ID", "ROM_COD", "SERL_NUM", "SUPR_NAM",
];

const SDR_TEXT: [&str; 16] = [
    "HAND_TYP", "HAND_ID", "CARD_TYP", "CARD_ID", "LOAD_TYP", "LOAD_ID", "DIB_TYP", "DIB_ID",
    "CABL_TYP", "CABL_ID", "CONT_TYP", "CONT_ID", "LASR_TYP", "LASR_ID", "EXTR_TYP", "EXTR_ID",
];

const PMR_TEXT: [&str; 3] = ["CHAN_NAM", "PHY_NAM", "LOG_NAM"];

const PRR_TEXT: [&str; 3] = ["PART_ID", "PART_TXT", "PART_FIX"];

const WRR_TEXT: [&str; 6] = [
    "WAFER_ID", "FABWF_ID", "FRAME_ID", "MASK_ID", "USR_DESC", "EXC_DESC",
];

/// Accumulates fields read from a payload into a record.
struct Fields<'p, 'a> {
    p: &'p mut Payload<'a>,
    record: DecodedRecord,
}

impl<'p, 'a> Fields<'p, 'a> {
    fn new(p: &'p mut Payload<'a>) -> Self {
        Self {
            p,
            record: DecodedRecord::new(),
        }
    }

    fn u8(&mut self, name: &'static str) -> Result<u8, DecodeError> {
        let v = self.p.u8(name)?;
        self.record.push(name, FieldValue::Unsigned(v.into()));
        Ok(v)
    }

    fn u16(&mut self, name: &'static str) -> Result<(), DecodeError> {
        let v = self.p.u16(name)?;
        self.record.push(name, FieldValue::Unsigned(v.into()));
        Ok(())
    }

    fn u32(&mut self, name: &'static str) -> Result<(), DecodeError> {
        let v = self.p.u32(name)?;
        self.record.push(name, FieldValue::Unsigned(v.into()));
        Ok(())
    }

    fn i16(&mut self, name: &'static str) -> Result<(), DecodeError> {
        let v = self.p.i16(name)?;
        self.record.push(name, FieldValue::Signed(v.into()));
        Ok(())
    }

    fn f32(&mut self, name: &'static str) -> Result<(), DecodeError> {
        let v = self.p.f32(name)?;
        self.record.push(name, FieldValue::Float(v));
        Ok(())
    }

    fn char(&mut self, name: &'static str) -> Result<(), DecodeError> {
        let c = self.p.char(name)?;
        self.record.push(name, FieldValue::Char(c));
        Ok(())
    }

    fn array(&mut self, name: &'static str, count: u8) -> Result<(), DecodeError> {
        let v = self.p.bytes(name, count.into())?;
        self.record.push(name, FieldValue::Array(v));
        Ok(())
    }

    /// The rest of the payload as one text field.
    fn text(&mut self, name: &'static str) -> Result<(), DecodeError> {
        let r = self.p.rest(name)?;
        self.record.push(name, FieldValue::Text(text(&r)));
        Ok(())
    }

    /// The rest of the payload, less `keep` bytes, as a text bundle.
    fn bundle(&mut self, names: &[&'static str], keep: usize) -> Result<(), DecodeError> {
        let span = self.p.rest_but(names[0], keep)?;

        let values = decode_bundle(&span, names.len()).map_err(|e| {
            let reason = format!("text bundle ended after {} of {} fields", e.found, e.expected);
            self.p.malformed(names[e.found], reason)
        })?;

        for (&name, value) in names.iter().zip(values) {
            self.record.push(name, FieldValue::Text(value));
        }

        Ok(())
    }

    fn finish(self) -> DecodedRecord {
        self.record
    }
}

/// File Attributes Record (0, 10)
pub fn decode_far(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("CPU_TYPE")?;
    f.u8("STDF_VER")?;
    Ok(f.finish())
}

/// Audit Trail Record (0, 20)
pub fn decode_atr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u32("MOD_TIM")?;
    f.text("CMD_LINE")?;
    Ok(f.finish())
}

/// Master Information Record (1, 10)
pub fn decode_mir(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u32("SETUP_T")?;
    f.u32("START_T")?;
    f.u8("STAT_NUM")?;
    f.char("MODE_COD")?;
    f.char("RTST_COD")?;
    f.char("PROT_COD")?;
    f.u16("BURN_TIM")?;
    f.char("CMOD_COD")?;
    f.bundle(&MIR_TEXT, 0)?;
    Ok(f.finish())
}

/// Master Results Record (1, 20)
///
/// The user and exec descriptions are kept together as `MRR_RET`.
pub fn decode_mrr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u32("FINISH_T")?;
    f.char("DISP_COD")?;
    f.text("MRR_RET")?;
    Ok(f.finish())
}

/// Part Count Record (1, 30)
pub fn decode_pcr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_NUM")?;
    f.u32("PART_CNT")?;
    f.u32("RTST_CNT")?;
    f.u32("ABRT_CNT")?;
    f.u32("GOOD_CNT")?;
    f.u32("FUNC_CNT")?;
    Ok(f.finish())
}

/// Hardware Bin Record (1, 40)
pub fn decode_hbr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_NUM")?;
    f.u16("HBIN_NUM")?;
    f.u32("HBIN_CNT")?;
    f.char("HBIN_PF")?;
    f.text("HBIN_NAM")?;
    Ok(f.finish())
}

/// Software Bin Record (1, 50)
pub fn decode_sbr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_NUM")?;
    f.u16("SBIN_NUM")?;
    f.u32("SBIN_CNT")?;
    f.char("SBIN_PF")?;
    f.text("SBIN_NAM")?;
    Ok(f.finish())
}

/// Pin Map Record (1, 60)
///
/// The head and site numbers follow the text bundle.
pub fn decode_pmr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u16("PMR_INDX")?;
    f.u16("CHAN_TYP")?;
    f.bundle(&PMR_TEXT, 2)?;
    f.u8("HEAD_NUM")?;
    f.u8("SITE_NUM")?;
    Ok(f.finish())
}

/// Site Description Record (1, 80)
pub fn decode_sdr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_GRP")?;
    let count = f.u8("SITE_CNT")?;
    f.array("SITE_NUM", count)?;
    f.bundle(&SDR_TEXT, 0)?;
    Ok(f.finish())
}

/// Wafer Information Record (2, 10)
pub fn decode_wir(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_GRP")?;
    f.u32("START_T")?;
    f.text("WAFER_ID")?;
    Ok(f.finish())
}

/// Wafer Results Record (2, 20)
pub fn decode_wrr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_GRP")?;
    f.u32("FINISH_T")?;
    f.u32("PART_CNT")?;
    f.u32("RTST_CNT")?;
    f.u32("ABRT_CNT")?;
    f.u32("GOOD_CNT")?;
    f.u32("FUNC_CNT")?;
    f.bundle(&WRR_TEXT, 0)?;
    Ok(f.finish())
}

/// Wafer Configuration Record (2, 30)
pub fn decode_wcr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.f32("WAFR_SIZ")?;
    f.f32("DIE_HT")?;
    f.f32("DIE_WID")?;
    f.u8("WF_UNITS")?;
    f.char("WF_FLAT")?;
    f.i16("CENTER_X")?;
    f.i16("CENTER_Y")?;
    f.char("POS_X")?;
    f.char("POS_Y")?;
    Ok(f.finish())
}

/// Part Information Record (5, 10)
pub fn decode_pir(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_NUM")?;
    Ok(f.finish())
}

/// Part Results Record (5, 20)
pub fn decode_prr(p: &mut Payload<'_>) -> Result<DecodedRecord, DecodeError> {
    let mut f = Fields::new(p);
    f.u8("HEAD_NUM")?;
    f.u8("SITE_NUM")?;
    f.u8("PART_FLG")?;
    f.u16("NUM_TEST")?;
    f.u16("HARD_BIN")?;
    f.u16("SOFT_BIN")?;
    f.i16("X_COORD")?;
    f.i16("Y_COORD")?;
    f.u32("TEST_T")?;
    f.bundle(&PRR_TEXT, 0)?;
    Ok(f.finish())
}

bitfield! {
    /// The `PART_FLG` byte of a Part Results Record.
    pub struct PartFlags(u8) {
        /// Supersedes an earlier result with the same `PART_ID`.
        [0] pub supersedes_part_id,
        /// Supersedes an earlier result at the same coordinates.
        [1] pub supersedes_coordinates,
        /// Testing ended abnormally.
        [2] pub abnormal_end,
        /// The part failed.
        [3] pub failed,
        /// The pass/fail bit carries no meaning.
        [4] pub no_pass_fail,
    }
}

impl PartFlags {
    /// Read the flags of a decoded PRR.
    pub fn of(record: &DecodedRecord) -> Option<Self> {
        match record.get("PART_FLG")? {
            FieldValue::Unsigned(v) => u8::try_from(*v).ok().map(PartFlags),
            _ => None,
        }
    }
}
