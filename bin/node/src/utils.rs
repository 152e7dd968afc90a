use std::time::Duration;

/// `clap` value parser for flags expressed in whole seconds, mirroring the teacher's own
/// `parse_duration_from_secs` helper threaded through `PayloadBuilderArgs`.
pub fn parse_duration_from_secs(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
