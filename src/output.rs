//! Results output formatting (CSV, JSON).

use crate::analysis::AnalysisResult;
use crate::error::Result;
use std::io::Write;

/// Write cascade results as CSV, one line per (stage, frequency).
///
/// Format:
/// ```csv
/// Stage,Frequency,Gain_dB,NF_dB
/// lna,1000000000,20,1
/// mixer,1000000000,13,1.1360
/// ```
///
/// A `P1dB_dBm` column is appended when the result carries a P1dB cascade.
pub fn write_csv<W: Write>(result: &AnalysisResult, writer: &mut W) -> Result<()> {
    write!(writer, "Stage,Frequency,Gain_dB,NF_dB")?;
    if result.p1db.is_some() {
        write!(writer, ",P1dB_dBm")?;
    }
    writeln!(writer)?;

    for (i, name) in result.stages.iter().enumerate() {
        for (j, freq) in result.freq[i].iter().enumerate() {
            write!(
                writer,
                "{},{},{},{}",
                name, freq, result.gain[i][j], result.nf[i][j]
            )?;
            if let Some(ref p1db) = result.p1db {
                write!(writer, ",{}", p1db[i][j])?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Write cascade results as pretty-printed JSON.
pub fn write_json<W: Write>(result: &AnalysisResult, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, result)?;
    writeln!(writer)?;
    Ok(())
}
