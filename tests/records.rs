mod support;

use stdfrec::sans::{
    field::{ByteOrder, DecodeError, Payload},
    record::{DecodedRecord, FieldValue},
    records::PartFlags,
    registry::RecordKind,
};
use support::Body;

use stdfrec::sans::record::FieldValue::{Array, Char, Float, Signed, Text, Unsigned};

/// Decode a little-endian payload the way the decode loops do, payload
/// offset 4.
fn decode(kind: RecordKind, body: Body) -> Result<DecodedRecord, DecodeError> {
    decode_as(kind, body.0.len() as u16, body)
}

fn decode_as(kind: RecordKind, length: u16, body: Body) -> Result<DecodedRecord, DecodeError> {
    let mut r = body.0.as_slice();
    let mut p = Payload::new(&mut r, kind.tag(), length, 4, ByteOrder::Little);
    let record = (kind.decoder())(&mut p)?;
    p.ensure_consumed()?;
    Ok(record)
}

fn text(s: &str) -> FieldValue {
    Text(s.to_string())
}

fn fields(record: &DecodedRecord) -> Vec<(&'static str, FieldValue)> {
    record.iter().map(|(n, v)| (n, v.clone())).collect()
}

#[test]
fn far() {
    let record = decode(RecordKind::Far, Body::new().u8(1).u8(4)).unwrap();
    assert_eq!(
        fields(&record),
        [("CPU_TYPE", Unsigned(1)), ("STDF_VER", Unsigned(4))]
    );
}

#[test]
fn far_with_trailing_byte() {
    let err = decode(RecordKind::Far, Body::new().u8(1).u8(4).u8(0)).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedField { kind: "FAR", offset: 6, .. }));
}

#[test]
fn atr() {
    let body = Body::new().u32(1_700_000_000).raw(b"run --site 2");
    let record = decode(RecordKind::Atr, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("MOD_TIM", Unsigned(1_700_000_000)),
            ("CMD_LINE", text("run --site 2")),
        ]
    );
}

#[test]
fn mir() {
    let mut body = Body::new()
        .u32(100)
        .u32(200)
        .u8(7)
        .raw(b"P")
        .raw(b" ")
        .raw(b"0")
        .u16(65535)
        .raw(b"A")
        .cn("LOT9")
        .cn("DEV")
        .cn("node");
    for _ in 3..29 {
        body = body.cn("");
    }
    body = body.cn("boss");

    let record = decode(RecordKind::Mir, body).unwrap();

    assert_eq!(record.len(), 38);
    let names: Vec<_> = record.names().collect();
    assert_eq!(
        names[..9],
        [
            "SETUP_T", "START_T", "STAT_NUM", "MODE_COD", "RTST_COD", "PROT_COD", "BURN_TIM",
            "CMOD_COD", "LOT_ID"
        ]
    );
    assert_eq!(names[37], "SUPR_NAM");

    assert_eq!(record.get("START_T"), Some(&Unsigned(200)));
    assert_eq!(record.get("MODE_COD"), Some(&Char(b'P')));
    assert_eq!(record.get("RTST_COD"), Some(&Char(b' ')));
    assert_eq!(record.get("BURN_TIM"), Some(&Unsigned(65535)));
    assert_eq!(record.get("LOT_ID"), Some(&text("LOT9")));
    assert_eq!(record.get("NODE_NAM"), Some(&text("node")));
    assert_eq!(record.get("TSTR_TYP"), Some(&text("")));
    assert_eq!(record.get("SUPR_NAM"), Some(&text("boss")));
}

#[test]
fn mir_short_bundle() {
    let body = Body::new()
        .u32(100)
        .u32(200)
        .u8(7)
        .raw(b"PNN")
        .u16(0)
        .raw(b"A")
        .cn("LOT9")
        .cn("DEV");

    let err = decode(RecordKind::Mir, body).unwrap_err();
    match err {
        DecodeError::MalformedField { kind, field, .. } => {
            assert_eq!(kind, "MIR");
            assert_eq!(field, "NODE_NAM");
        }
        err => panic!("unexpected {err:?}"),
    }
}

#[test]
fn sdr() {
    let mut body = Body::new().u8(1).u8(3).u8(2).u8(4).u8(5).cn("tel").cn("h1");
    for _ in 2..16 {
        body = body.cn("");
    }

    let record = decode(RecordKind::Sdr, body).unwrap();

    assert_eq!(record.len(), 20);
    assert_eq!(record.get("SITE_CNT"), Some(&Unsigned(2)));
    assert_eq!(record.get("SITE_NUM"), Some(&Array(vec![4, 5])));
    assert_eq!(record.get("HAND_TYP"), Some(&text("tel")));
    assert_eq!(record.get("HAND_ID"), Some(&text("h1")));
    assert_eq!(record.get("EXTR_ID"), Some(&text("")));
}

#[test]
fn pmr_fixed_fields_follow_bundle() {
    let body = Body::new()
        .u16(12)
        .u16(3)
        .cn("CH12")
        .cn("P12")
        .cn("VDD")
        .u8(1)
        .u8(2);

    let record = decode(RecordKind::Pmr, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("PMR_INDX", Unsigned(12)),
            ("CHAN_TYP", Unsigned(3)),
            ("CHAN_NAM", text("CH12")),
            ("PHY_NAM", text("P12")),
            ("LOG_NAM", text("VDD")),
            ("HEAD_NUM", Unsigned(1)),
            ("SITE_NUM", Unsigned(2)),
        ]
    );
}

#[test]
fn pmr_too_short_for_trailing_fields() {
    let body = Body::new().u16(12).u16(3).u8(0);
    let err = decode(RecordKind::Pmr, body).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::MalformedField { field: "CHAN_NAM", .. }
    ));
}

#[test]
fn wcr() {
    let body = Body::new()
        .f32(300.0)
        .f32(7.25)
        .f32(6.5)
        .u8(3)
        .raw(b"D")
        .i16(-12)
        .i16(40)
        .raw(b"R")
        .raw(b"D");

    let record = decode(RecordKind::Wcr, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("WAFR_SIZ", Float(300.0)),
            ("DIE_HT", Float(7.25)),
            ("DIE_WID", Float(6.5)),
            ("WF_UNITS", Unsigned(3)),
            ("WF_FLAT", Char(b'D')),
            ("CENTER_X", Signed(-12)),
            ("CENTER_Y", Signed(40)),
            ("POS_X", Char(b'R')),
            ("POS_Y", Char(b'D')),
        ]
    );
}

#[test]
fn wir_wafer_id_is_not_split() {
    let body = Body::new().u8(1).u8(255).u32(1_000_000_000).raw(b"WF07");
    let record = decode(RecordKind::Wir, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("HEAD_NUM", Unsigned(1)),
            ("SITE_GRP", Unsigned(255)),
            ("START_T", Unsigned(1_000_000_000)),
            ("WAFER_ID", text("WF07")),
        ]
    );

    let body = Body::new().u8(1).u8(255).u32(0).raw(b"LOT 7 W1");
    let record = decode(RecordKind::Wir, body).unwrap();
    assert_eq!(record.get("WAFER_ID"), Some(&text("LOT 7 W1")));
}

#[test]
fn wir_keeps_length_byte() {
    let body = Body::new().u8(1).u8(255).u32(0).cn("WF07");
    let record = decode(RecordKind::Wir, body).unwrap();
    assert_eq!(record.get("WAFER_ID"), Some(&text("\u{4}WF07")));
}

#[test]
fn pir() {
    let record = decode(RecordKind::Pir, Body::new().u8(2).u8(9)).unwrap();
    assert_eq!(
        fields(&record),
        [("HEAD_NUM", Unsigned(2)), ("SITE_NUM", Unsigned(9))]
    );
}

#[test]
fn prr() {
    let body = Body::new()
        .u8(1)
        .u8(3)
        .u8(0b1001)
        .u16(42)
        .u16(5)
        .u16(17)
        .i16(-4)
        .i16(11)
        .u32(1250)
        .cn("P1")
        .cn("")
        .cn("");

    let record = decode(RecordKind::Prr, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("HEAD_NUM", Unsigned(1)),
            ("SITE_NUM", Unsigned(3)),
            ("PART_FLG", Unsigned(0b1001)),
            ("NUM_TEST", Unsigned(42)),
            ("HARD_BIN", Unsigned(5)),
            ("SOFT_BIN", Unsigned(17)),
            ("X_COORD", Signed(-4)),
            ("Y_COORD", Signed(11)),
            ("TEST_T", Unsigned(1250)),
            ("PART_ID", text("P1")),
            ("PART_TXT", text("")),
            ("PART_FIX", text("")),
        ]
    );

    let flags = PartFlags::of(&record).unwrap();
    assert!(flags.supersedes_part_id());
    assert!(flags.failed());
    assert!(!flags.abnormal_end());
    assert!(!flags.no_pass_fail());
}

#[test]
fn prr_space_in_text_shifts_fields() {
    let body = Body::new()
        .u8(1)
        .u8(0)
        .u8(0)
        .u16(1)
        .u16(1)
        .u16(1)
        .i16(0)
        .i16(0)
        .u32(0)
        .cn("A B")
        .cn("")
        .cn("");

    let record = decode(RecordKind::Prr, body).unwrap();
    assert_eq!(record.get("PART_ID"), Some(&text("A")));
    assert_eq!(record.get("PART_TXT"), Some(&text("B")));
    assert_eq!(record.get("PART_FIX"), Some(&text("")));
}

#[test]
fn wrr() {
    let body = Body::new()
        .u8(1)
        .u8(255)
        .u32(900)
        .u32(10)
        .u32(1)
        .u32(0)
        .u32(8)
        .u32(9)
        .cn("WF07")
        .cn("FAB7")
        .cn("")
        .cn("M1")
        .cn("")
        .cn("");

    let record = decode(RecordKind::Wrr, body).unwrap();
    assert_eq!(record.len(), 14);
    assert_eq!(record.get("GOOD_CNT"), Some(&Unsigned(8)));
    assert_eq!(record.get("FUNC_CNT"), Some(&Unsigned(9)));
    assert_eq!(record.get("WAFER_ID"), Some(&text("WF07")));
    assert_eq!(record.get("FABWF_ID"), Some(&text("FAB7")));
    assert_eq!(record.get("MASK_ID"), Some(&text("M1")));
    assert_eq!(record.get("EXC_DESC"), Some(&text("")));
}

#[test]
fn hbr_and_sbr() {
    let body = || Body::new().u8(255).u8(0).u16(3).u32(120).raw(b"F").raw(b"LEAKAGE");

    let record = decode(RecordKind::Hbr, body()).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("HEAD_NUM", Unsigned(255)),
            ("SITE_NUM", Unsigned(0)),
            ("HBIN_NUM", Unsigned(3)),
            ("HBIN_CNT", Unsigned(120)),
            ("HBIN_PF", Char(b'F')),
            ("HBIN_NAM", text("LEAKAGE")),
        ]
    );

    let record = decode(RecordKind::Sbr, body()).unwrap();
    let names: Vec<_> = record.names().collect();
    assert_eq!(
        names,
        ["HEAD_NUM", "SITE_NUM", "SBIN_NUM", "SBIN_CNT", "SBIN_PF", "SBIN_NAM"]
    );
    assert_eq!(record.get("SBIN_NAM"), Some(&text("LEAKAGE")));
}

#[test]
fn pcr() {
    let body = Body::new().u8(1).u8(2).u32(10).u32(2).u32(1).u32(7).u32(8);
    let record = decode(RecordKind::Pcr, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("HEAD_NUM", Unsigned(1)),
            ("SITE_NUM", Unsigned(2)),
            ("PART_CNT", Unsigned(10)),
            ("RTST_CNT", Unsigned(2)),
            ("ABRT_CNT", Unsigned(1)),
            ("GOOD_CNT", Unsigned(7)),
            ("FUNC_CNT", Unsigned(8)),
        ]
    );
}

#[test]
fn pcr_truncated() {
    let body = Body::new().u8(1).u8(2).u32(10);
    let err = decode_as(RecordKind::Pcr, 22, body).unwrap_err();
    match err {
        DecodeError::TruncatedPayload {
            kind,
            expected,
            found,
            ..
        } => {
            assert_eq!(kind, "PCR");
            assert_eq!(expected, 22);
            assert_eq!(found, 6);
        }
        err => panic!("unexpected {err:?}"),
    }
}

#[test]
fn mrr() {
    let body = Body::new().u32(5000).raw(b"Q").cn("ok").cn("");
    let record = decode(RecordKind::Mrr, body).unwrap();
    assert_eq!(
        fields(&record),
        [
            ("FINISH_T", Unsigned(5000)),
            ("DISP_COD", Char(b'Q')),
            ("MRR_RET", text("\u{2}ok\u{0}")),
        ]
    );
}

#[test]
fn big_endian_fields() {
    let data = [0x00, 0x2a, 0xff, 0xfe, 0x00, 0x00, 0x00, 0x01, 0x41, 0x42];
    let mut r = &data[..];
    let mut p = Payload::new(&mut r, "TEST", data.len() as u16, 0, ByteOrder::Big);

    assert_eq!(p.u16("A").unwrap(), 42);
    assert_eq!(p.i16("B").unwrap(), -2);
    assert_eq!(p.u32("C").unwrap(), 1);
    assert_eq!(p.char("D").unwrap(), b'A');
    assert_eq!(p.remaining(), 1);
    assert_eq!(p.position(), 9);
    assert!(matches!(
        p.u16("E"),
        Err(DecodeError::MalformedField { field: "E", offset: 9, .. })
    ));
    assert_eq!(p.rest("F").unwrap(), b"B");
    p.ensure_consumed().unwrap();
}
