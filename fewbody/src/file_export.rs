use crate::history::FrameHistory;

pub fn write_csv(
    filename: &std::path::Path,
    signals: &[(&str, &[f64])],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(filename)?;

    let titles = signals.iter().map(|s| s.0);

    writer.write_record(titles)?;

    for i in 0.. {
        let row = signals
            .iter()
            .map(|s| s.1.get(i))
            .map(|s| s.map(|e| format!("{:0.8}", e)))
            .collect::<Option<Vec<_>>>();
        if let Some(row) = row {
            writer.write_record(row)?;
        } else {
            break;
        }
    }

    writer.flush()?;

    Ok(())
}

/// One `t` column and one column per channel, populated frames only.
pub fn write_history_csv(
    filename: &std::path::Path,
    history: &FrameHistory,
) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<String> = history.channels().iter().map(|c| c.to_string()).collect();

    let mut signals: Vec<(&str, &[f64])> = vec![("t", history.times())];
    signals.extend(
        labels
            .iter()
            .zip(history.columns())
            .map(|(l, (_, d))| (l.as_str(), d)),
    );

    write_csv(filename, &signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{Channel, Quantity};

    #[test]
    fn history_export() {
        let mut h = FrameHistory::new(
            vec![
                Channel::new(1, Quantity::X),
                Channel::new(2, Quantity::Eccentricity),
            ],
            4,
        );
        h.record(0, 0.0, &[1.0, 0.5]).unwrap();
        h.record(1, 2.0, &[1.5, 0.25]).unwrap();

        let path = std::env::temp_dir().join("fewbody_history.csv");
        write_history_csv(&path, &h).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "t,x[1],e[2]");
        assert_eq!(lines[2], "2.00000000,1.50000000,0.25000000");
        let _ = std::fs::remove_file(&path);
    }
}
