use super::Batch;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use scan_batcher_calculator::{DpiOption, DpiResult, Rounding, ScanRequest, validate_limits};
use scan_batcher_template::Context;
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Template key of the resolution chosen for a scan.
pub const SCAN_DPI: &str = "scan_dpi";

/// Photo and image sizes known up front. Missing ones are asked for on every cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimensions {
    pub photo_width: Option<f64>,
    pub photo_height: Option<f64>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
}

/// Scanner constraints applied to every calculation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub min_dpi: Option<u32>,
    pub max_dpi: Option<u32>,
    pub dpis: Vec<u32>,
    pub rounding: Rounding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Note {
    None,
    Calculated,
    Recommended,
}
impl Note {
    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Calculated => "calculated",
            Self::Recommended => "recommended",
        }
    }
}

/// Asks for a resolution on the terminal: once (`calculate`) or for every
/// scan (`scan`).
pub struct Interactive<R, W> {
    input: R,
    output: W,
    dimensions: Dimensions,
    limits: Limits,
    repeat: bool,
    finished: bool,
    /// Whether the current cycle has read any input yet.
    prompted: bool,
}
impl<R: BufRead, W: Write> Interactive<R, W> {
    /// A single calculation that yields no workflow item.
    pub fn calculate(input: R, output: W, dimensions: Dimensions, limits: Limits) -> Result<Self> {
        Self::new(input, output, dimensions, limits, false)
    }

    /// One calculation per scan, until input ends.
    pub fn scan(input: R, output: W, dimensions: Dimensions, limits: Limits) -> Result<Self> {
        Self::new(input, output, dimensions, limits, true)
    }

    /// Fails with [`ErrorKind::Calculation`] when `limits` could never produce a resolution.
    fn new(input: R, output: W, dimensions: Dimensions, limits: Limits, repeat: bool) -> Result<Self> {
        validate_limits(limits.min_dpi, limits.max_dpi, &limits.dpis).or_raise(|| ErrorKind::Calculation)?;
        Ok(Self { input, output, dimensions, limits, repeat, finished: false, prompted: false })
    }

    /// Prints `prompt` and reads one trimmed line, or `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}").or_raise(|| ErrorKind::Terminal)?;
        self.output.flush().or_raise(|| ErrorKind::Terminal)?;
        self.prompted = true;
        let mut line = String::new();
        if self.input.read_line(&mut line).or_raise(|| ErrorKind::Terminal)? == 0 {
            tracing::debug!("End of input");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: std::fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.output, "{message}").or_raise(|| ErrorKind::Terminal)
    }

    /// Returns `given` if present, otherwise asks until a positive number is entered.
    fn dimension<T>(&mut self, given: Option<T>, prompt: &str) -> Result<Option<T>>
    where
        T: FromStr + PartialOrd + Default + Copy,
    {
        if given.is_some() {
            return Ok(given);
        }
        loop {
            let Some(line) = self.ask(prompt)? else { return Ok(None) };
            match line.parse::<T>() {
                Ok(value) if value > T::default() => return Ok(Some(value)),
                _ => {
                    tracing::debug!(input = %line, "Invalid number entered");
                    self.say(format_args!("Error: Enter a positive number"))?;
                },
            }
        }
    }

    fn request(&mut self) -> Result<Option<ScanRequest>> {
        let d = self.dimensions;
        let Some(photo_width) = self.dimension(d.photo_width, "Photo width in centimeters: ")? else {
            return Ok(None);
        };
        let Some(photo_height) = self.dimension(d.photo_height, "Photo height in centimeters: ")? else {
            return Ok(None);
        };
        let Some(image_width) = self.dimension(d.image_width, "Image width in pixels: ")? else {
            return Ok(None);
        };
        let Some(image_height) = self.dimension(d.image_height, "Image height in pixels: ")? else {
            return Ok(None);
        };
        tracing::info!(photo_width, photo_height, image_width, image_height, "Scan parameters entered");
        Ok(Some(
            ScanRequest::new((photo_width, photo_height), (image_width, image_height))
                .with_bounds(self.limits.min_dpi, self.limits.max_dpi)
                .with_menu(self.limits.dpis.iter().copied())
                .with_rounding(self.limits.rounding),
        ))
    }

    fn print_row(&mut self, num: &str, dpi: &str, pixels: &str, note: &str) -> Result<()> {
        let row = format!("{num:>3}\t{dpi:>10}\t{pixels:>10}\t{note:<20}");
        self.say(format_args!("{}", row.trim_end()))
    }

    /// Asks for a row of `rows`; an empty answer or `0` selects the recommended DPI.
    fn select(&mut self, rows: &[(DpiOption, Note)], recommended: u32) -> Result<Option<u32>> {
        loop {
            let prompt = "\nSelect a DPI by entering the corresponding # from the table above \
                          (press Enter to use the recommended one): ";
            let Some(line) = self.ask(prompt)? else { return Ok(None) };
            if line.is_empty() || line == "0" {
                self.say(format_args!("\nUsing recommended DPI: {recommended}"))?;
                return Ok(Some(recommended));
            }
            match line.parse::<usize>().ok().and_then(|index| index.checked_sub(1)).and_then(|i| rows.get(i)) {
                Some((option, _)) => {
                    self.say(format_args!("\nSelected DPI: {}", option.dpi))?;
                    return Ok(Some(option.dpi));
                },
                None => {
                    tracing::debug!(input = %line, "Invalid DPI selection");
                    self.say(format_args!("Error: Invalid selection. Please try again."))?;
                },
            }
        }
    }

    /// One full prompt, calculate, choose cycle.
    fn cycle(&mut self) -> Result<Option<u32>> {
        self.say(format_args!("\nEnter scan parameters"))?;
        let Some(request) = self.request()? else { return Ok(None) };
        let result = request.calculate().or_raise(|| ErrorKind::Calculation)?;
        let photo_long = request.photo.0.max(request.photo.1);

        let rows = table(&result, photo_long);
        self.say(format_args!("\nCalculation results:"))?;
        self.print_row("", "DPI", "pixels", "Note")?;
        for (index, (option, note)) in rows.iter().enumerate() {
            self.print_row(&(index + 1).to_string(), &option.dpi.to_string(), &option.pixels.to_string(), note.as_str())?;
        }

        let selected = self.select(&rows, result.recommended_dpi)?;
        if let Some(dpi) = selected {
            tracing::info!(dpi, "Scan resolution selected");
        }
        Ok(selected)
    }
}
impl<R: BufRead, W: Write> Batch for Interactive<R, W> {
    fn next_item(&mut self) -> Result<Option<Context>> {
        if self.finished {
            return Ok(None);
        }
        if !self.repeat {
            self.finished = true;
        }
        self.prompted = false;
        let dpi = match self.cycle() {
            Ok(Some(dpi)) => dpi,
            Ok(None) => {
                self.finished = true;
                return Ok(None);
            },
            Err(err) => {
                // Asking again would fail the same way without any new input.
                if !self.prompted {
                    self.finished = true;
                }
                return Err(err);
            },
        };
        if !self.repeat {
            return Ok(None);
        }
        let mut context = Context::new();
        context.insert(SCAN_DPI, dpi);
        Ok(Some(context))
    }
}

/// The menu options plus the calculated and recommended resolutions, ascending.
fn table(result: &DpiResult, photo_long: f64) -> Vec<(DpiOption, Note)> {
    let calculated = result.calculated_dpi as u32;
    let mut options: BTreeSet<DpiOption> = result.options.iter().copied().collect();
    options.insert(DpiOption::for_side(calculated, photo_long));
    options.insert(DpiOption::for_side(result.recommended_dpi, photo_long));
    options
        .into_iter()
        .map(|option| {
            let note = match option.dpi {
                dpi if dpi == result.recommended_dpi => Note::Recommended,
                dpi if dpi == calculated => Note::Calculated,
                _ => Note::None,
            };
            (option, note)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn limits() -> Limits {
        Limits { dpis: vec![600, 150, 300], ..Limits::default() }
    }

    fn dimensions() -> Dimensions {
        Dimensions { photo_width: Some(15.0), photo_height: Some(10.0), image_width: Some(3000), image_height: Some(2000) }
    }

    #[test]
    fn test_table_marks_calculated_and_recommended() {
        let result = DpiResult {
            calculated_dpi: 420.7,
            recommended_dpi: 300,
            options: vec![DpiOption::for_side(150, 15.0), DpiOption::for_side(300, 15.0)],
        };
        let rows: Vec<_> = table(&result, 15.0).into_iter().map(|(o, n)| (o.dpi, n)).collect();
        assert_eq!(rows, vec![(150, Note::None), (300, Note::Recommended), (420, Note::Calculated)]);
    }

    #[test]
    fn test_calculate_uses_recommended_on_enter() {
        let mut output = Vec::new();
        let mut batch = Interactive::calculate(Cursor::new("\n"), &mut output, dimensions(), limits()).unwrap();
        assert!(batch.next_item().unwrap().is_none());
        assert!(batch.next_item().unwrap().is_none());
        drop(batch);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Calculation results:"));
        assert!(output.contains("recommended"));
        assert!(output.contains("Using recommended DPI: 600"));
    }

    #[test]
    fn test_scan_prompts_for_missing_dimensions() {
        let input = "abc\n15\n10\n-5\n3000\n2000\n9\n2\n";
        let mut output = Vec::new();
        let mut batch = Interactive::scan(Cursor::new(input), &mut output, Dimensions::default(), limits()).unwrap();

        let item = batch.next_item().unwrap().unwrap();
        assert_eq!(item.get(SCAN_DPI).unwrap().to_string(), "300");
        assert!(batch.next_item().unwrap().is_none());
        drop(batch);

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Error: Enter a positive number").count(), 2);
        assert!(output.contains("Error: Invalid selection. Please try again."));
        assert!(output.contains("Selected DPI: 300"));
    }

    #[test]
    fn test_calculate_zero_selects_recommended() {
        let mut output = Vec::new();
        let mut batch = Interactive::calculate(Cursor::new("0\n"), &mut output, dimensions(), limits()).unwrap();
        assert!(batch.next_item().unwrap().is_none());
        drop(batch);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Using recommended DPI: 600"));
        assert!(!output.contains("Invalid selection"));
    }

    #[test]
    fn test_invalid_limits_rejected_up_front() {
        let limits = Limits { min_dpi: Some(900), max_dpi: Some(600), ..limits() };
        let err = Interactive::scan(Cursor::new(""), Vec::new(), dimensions(), limits).err().unwrap();
        assert_eq!(*err, ErrorKind::Calculation);

        let limits = Limits { dpis: vec![300, 0], ..Limits::default() };
        let err = Interactive::calculate(Cursor::new(""), Vec::new(), dimensions(), limits).err().unwrap();
        assert_eq!(*err, ErrorKind::Calculation);
    }

    #[test]
    fn test_scan_ends_when_failing_without_input() {
        let fixed = Dimensions { photo_width: Some(f64::INFINITY), ..dimensions() };
        let mut batch = Interactive::scan(Cursor::new("\n\n\n"), Vec::new(), fixed, limits()).unwrap();
        let err = batch.next_item().unwrap_err();
        assert_eq!(*err, ErrorKind::Calculation);
        assert!(batch.next_item().unwrap().is_none());
    }

    #[test]
    fn test_scan_asks_again_after_entered_values_fail() {
        let input = "inf\n10\n3000\n2000\n15\n10\n3000\n2000\n\n";
        let mut batch = Interactive::scan(Cursor::new(input), Vec::new(), Dimensions::default(), limits()).unwrap();
        assert_eq!(*batch.next_item().unwrap_err(), ErrorKind::Calculation);
        let item = batch.next_item().unwrap().unwrap();
        assert_eq!(item.get(SCAN_DPI).unwrap().to_string(), "600");
        assert!(batch.next_item().unwrap().is_none());
    }
}
