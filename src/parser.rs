//! Stackup netlist parser.
//!
//! Parses a SPICE-flavoured description of an RF chain into a [`CascadeJob`].
//!
//! # Supported syntax
//!
//! ```text
//! * comment line
//! .CURVE name f1 m1 f2 m2 ...            (frequency/magnitude pairs, >= 2)
//! stage GAIN=curve NF=curve [P1DB=curve] (one chain stage, in signal order)
//! .SWEEP fstart fstop ppm [RBW=v] [TEMP=v] [PIN=v] [SNR=v]
//! .END
//! ```
//!
//! Values support engineering suffixes: T, G, MEG, K, M, U, N, P, F
//! (case-insensitive). Keywords are case-insensitive; curve and stage names
//! are not. Curves may be referenced before they are declared.

use std::collections::HashMap;

use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while1};
use nom::combinator::{map, opt};
use nom::number::complete::double;
use nom::IResult;
use nom::Parser;

use crate::curve::FrequencyCurve;
use crate::error::{CascadeError, Result};
use crate::ir::{CascadeJob, StackupEntry, SweepParams};

/// A stage line before its curve references are resolved.
#[derive(Debug)]
struct StageDecl {
    line_num: usize,
    name: String,
    gain: Option<String>,
    nf: Option<String>,
    p1db: Option<String>,
}

/// Parse a stackup netlist string into a CascadeJob.
pub fn parse(input: &str) -> Result<CascadeJob> {
    let mut curves: HashMap<String, FrequencyCurve> = HashMap::new();
    let mut stages: Vec<StageDecl> = Vec::new();
    let mut sweep: Option<SweepParams> = None;

    for (line_num, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('*') {
            continue;
        }

        let upper = line.to_uppercase();
        if upper == ".END" {
            break;
        }

        if upper.starts_with(".CURVE") {
            let (name, curve) =
                parse_curve_command(line).map_err(|e| parse_err(line_num, raw_line, &e))?;
            if curves.contains_key(&name) {
                return Err(parse_err(
                    line_num,
                    raw_line,
                    &format!("duplicate curve '{}'", name),
                ));
            }
            curves.insert(name, curve);
        } else if upper.starts_with(".SWEEP") {
            let params =
                parse_sweep_command(line).map_err(|e| parse_err(line_num, raw_line, &e))?;
            if sweep.is_some() {
                return Err(parse_err(line_num, raw_line, "duplicate .SWEEP"));
            }
            sweep = Some(params);
        } else if line.starts_with('.') {
            // Unrecognised dot commands (.TITLE etc.) are ignored
            tracing::debug!(line = line_num + 1, "ignoring dot command: {}", line);
        } else {
            let stage = parse_stage_line(line, line_num)
                .map_err(|e| parse_err(line_num, raw_line, &e))?;
            stages.push(stage);
        }
    }

    let params = sweep.ok_or_else(|| CascadeError::Parse("missing .SWEEP command".to_string()))?;

    let stackup = stages
        .into_iter()
        .map(|decl| resolve_stage(decl, &curves))
        .collect::<Result<Vec<_>>>()?;

    Ok(CascadeJob { stackup, params })
}

fn parse_err(line_num: usize, raw_line: &str, detail: &str) -> CascadeError {
    CascadeError::Parse(format!("line {}: {} in: {}", line_num + 1, detail, raw_line))
}

fn resolve_stage(decl: StageDecl, curves: &HashMap<String, FrequencyCurve>) -> Result<StackupEntry> {
    let StageDecl {
        line_num,
        name,
        gain,
        nf,
        p1db,
    } = decl;

    let lookup = |curve: Option<String>| -> Result<Option<FrequencyCurve>> {
        let Some(curve) = curve else {
            return Ok(None);
        };
        curves.get(&curve).cloned().map(Some).ok_or_else(|| {
            CascadeError::Parse(format!(
                "line {}: stage '{}' references unknown curve '{}'",
                line_num + 1,
                name,
                curve
            ))
        })
    };

    let gain = lookup(gain)?;
    let nf = lookup(nf)?;
    let p1db = lookup(p1db)?;
    Ok(StackupEntry {
        name,
        gain,
        nf,
        p1db,
    })
}

// ---------------------------------------------------------------------------
// Engineering suffix value parser
// ---------------------------------------------------------------------------

/// Parse a numeric value with optional engineering suffix.
/// Handles: 2.4G, 100MEG, 10k, 1e9, -3.5, etc.
fn eng_value(input: &str) -> IResult<&str, f64> {
    let (rest, num) = double(input)?;
    let (rest, suffix) = opt(eng_suffix).parse(rest)?;
    let multiplier = suffix.unwrap_or(1.0);
    Ok((rest, num * multiplier))
}

/// Match an engineering suffix and return its multiplier.
fn eng_suffix(input: &str) -> IResult<&str, f64> {
    // MEG before M
    alt((
        map(tag_no_case("MEG"), |_: &str| 1e6),
        map(tag_no_case("T"), |_: &str| 1e12),
        map(tag_no_case("G"), |_: &str| 1e9),
        map(tag_no_case("K"), |_: &str| 1e3),
        map(tag_no_case("M"), |_: &str| 1e-3),
        map(tag_no_case("U"), |_: &str| 1e-6),
        map(tag_no_case("N"), |_: &str| 1e-9),
        map(tag_no_case("P"), |_: &str| 1e-12),
        map(tag_no_case("F"), |_: &str| 1e-15),
    ))
    .parse(input)
}

/// Parse a single whitespace-delimited number, rejecting trailing garbage.
fn number_token<'a>(input: &'a str, what: &str) -> std::result::Result<(&'a str, f64), String> {
    let (rest, value) = eng_value(input).map_err(|_| format!("failed to parse {}", what))?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return Err(format!("unexpected text after {}: '{}'", what, rest));
    }
    Ok((rest.trim_start(), value))
}

/// Convert a parsed value to whole Hz.
fn to_hz(value: f64, what: &str) -> std::result::Result<u64, String> {
    let rounded = value.round();
    if !value.is_finite() || rounded < 0.0 || rounded > u64::MAX as f64 {
        return Err(format!("{} out of range: {}", what, value));
    }
    if (value - rounded).abs() > 1e-3 {
        return Err(format!("{} must be a whole number of Hz: {}", what, value));
    }
    Ok(rounded as u64)
}

// ---------------------------------------------------------------------------
// Token parsers
// ---------------------------------------------------------------------------

/// Parse a curve name as declared by `.CURVE` and referenced by `GAIN=`/`NF=`/`P1DB=`.
fn curve_id(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Parse a stage name (everything up to the first whitespace).
fn stage_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

// ---------------------------------------------------------------------------
// Stage parsing
// ---------------------------------------------------------------------------

/// Parse a stage line: name GAIN=curve NF=curve [P1DB=curve]
fn parse_stage_line(line: &str, line_num: usize) -> std::result::Result<StageDecl, String> {
    let (rest, name) = stage_name(line).map_err(|_| "failed to parse stage name".to_string())?;

    let mut stage = StageDecl {
        line_num,
        name: name.to_string(),
        gain: None,
        nf: None,
        p1db: None,
    };

    for token in rest.split_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=curve, got '{}'", token))?;
        let (tail, id) =
            curve_id(value).map_err(|_| format!("invalid curve name in '{}'", token))?;
        if !tail.is_empty() {
            return Err(format!("invalid curve name in '{}'", token));
        }

        let slot = match key.to_uppercase().as_str() {
            "GAIN" => &mut stage.gain,
            "NF" => &mut stage.nf,
            "P1DB" => &mut stage.p1db,
            _ => return Err(format!("unknown stage parameter: {}", key)),
        };
        if slot.is_some() {
            return Err(format!("{} given twice", key.to_uppercase()));
        }
        *slot = Some(id.to_string());
    }

    Ok(stage)
}

// ---------------------------------------------------------------------------
// Dot-command parsing
// ---------------------------------------------------------------------------

/// Parse: .CURVE name f1 m1 f2 m2 ...
fn parse_curve_command(line: &str) -> std::result::Result<(String, FrequencyCurve), String> {
    let rest = line[6..].trim_start();

    let (rest, name) =
        curve_id(rest).map_err(|_| "expected curve name after .CURVE".to_string())?;
    let mut rest = rest.trim_start();

    let mut freq = Vec::new();
    let mut mag = Vec::new();
    while !rest.is_empty() {
        let (r, f) = number_token(rest, "curve frequency")?;
        freq.push(to_hz(f, "curve frequency")?);
        if r.is_empty() {
            return Err(format!("frequency {} has no magnitude", f));
        }
        let (r, m) = number_token(r, "curve magnitude")?;
        mag.push(m);
        rest = r;
    }

    let curve = FrequencyCurve::new(freq, mag, name).map_err(|e| e.to_string())?;
    Ok((name.to_string(), curve))
}

/// Parse: .SWEEP fstart fstop ppm [RBW=v] [TEMP=v] [PIN=v] [SNR=v]
fn parse_sweep_command(line: &str) -> std::result::Result<SweepParams, String> {
    let rest = line[6..].trim_start();

    let (rest, f_start) = number_token(rest, "sweep start")?;
    let (rest, f_stop) = number_token(rest, "sweep stop")?;
    let (rest, ppm) = parse_u32(rest)?;
    let rest = rest.trim_start();

    let mut params = SweepParams::new(
        to_hz(f_start, "sweep start")?,
        to_hz(f_stop, "sweep stop")?,
        ppm,
    );

    for token in rest.split_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=value, got '{}'", token))?;
        let (tail, v) = eng_value(value).map_err(|_| format!("failed to parse {} value", key))?;
        if !tail.is_empty() {
            return Err(format!("failed to parse {} value: {}", key, value));
        }
        match key.to_uppercase().as_str() {
            "RBW" => params.rbw = to_hz(v, "RBW")?,
            "TEMP" => params.temp = v,
            "PIN" => params.pwr_in = v,
            "SNR" => params.min_snr = v,
            _ => return Err(format!("unknown sweep parameter: {}", key)),
        }
    }

    Ok(params)
}

fn parse_u32(input: &str) -> std::result::Result<(&str, u32), String> {
    let (rest, digits): (&str, &str) = take_while1(|c: char| c.is_ascii_digit())(input)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| {
            "expected integer points-per-MHz".to_string()
        })?;
    let n: u32 = digits
        .parse()
        .map_err(|_| "invalid points-per-MHz".to_string())?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return Err("points-per-MHz must be a whole number".to_string());
    }
    Ok((rest, n))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
