use crate::errors::DatasetError;
use crate::models::{
    ClientRecord, CountryRecord, Dataset, FailureRecord, PeriodRecord, RecordSet,
};
use std::collections::HashSet;

impl Dataset {
    /// The literal tables the dashboard ships with (KES, June to December).
    pub fn builtin() -> Self {
        let monthly = vec![
            PeriodRecord::month("June", 3239, 164_960_577.05, 76.97, 1179, 1669),
            PeriodRecord::month("July", 6147, 344_641_363.80, 82.43, 2337, 3076),
            PeriodRecord::month("August", 7311, 441_605_577.75, 85.21, 2845, 3265),
            PeriodRecord::month("September", 5853, 333_896_656.06, 79.07, 2422, 2704),
            PeriodRecord::month("October", 9986, 612_844_465.61, 84.20, 3561, 4139),
            PeriodRecord::month("November", 11574, 660_334_518.30, 78.33, 3784, 4366),
            PeriodRecord::month("December", 8217, 523_575_404.54, 86.84, 3367, 3858),
        ];

        let hourly = [
            ("12:00:00 AM", 31_422_733.80, 438),
            ("12:30:00 AM", 34_824_950.20, 449),
            ("1:00:00 AM", 37_178_383.70, 517),
            ("1:30:00 AM", 39_343_104.80, 510),
            ("2:00:00 AM", 33_641_452.40, 450),
            ("2:30:00 AM", 32_227_031.80, 418),
            ("3:00:00 AM", 34_648_925.80, 441),
            ("3:30:00 AM", 32_454_662.20, 469),
            ("4:00:00 AM", 42_374_824.70, 546),
            ("4:30:00 AM", 43_128_807.70, 574),
            ("5:00:00 AM", 46_059_732.10, 633),
            ("5:30:00 AM", 57_139_036.40, 774),
            ("6:00:00 AM", 58_015_932.50, 820),
            ("6:30:00 AM", 62_236_995.30, 815),
            ("7:00:00 AM", 60_833_204.50, 843),
            ("7:30:00 AM", 55_974_572.20, 789),
            ("8:00:00 AM", 77_837_841.00, 1026),
            ("8:30:00 AM", 67_626_737.50, 980),
            ("9:00:00 AM", 84_461_058.30, 1131),
            ("9:30:00 AM", 75_435_087.40, 1095),
            ("10:00:00 AM", 67_624_749.70, 1020),
            ("10:30:00 AM", 79_260_334.80, 1120),
            ("11:00:00 AM", 76_847_398.60, 1067),
            ("11:30:00 AM", 73_021_931.70, 1045),
        ]
        .into_iter()
        .map(|(label, volume, count)| PeriodRecord::slot(label, volume, count))
        .collect();

        let countries = [
            ("USA", 1_348_601_980.70, 15011, 43.79),
            ("GBR", 1_263_989_309.40, 20520, 41.04),
            ("CAN", 131_969_949.47, 2544, 4.28),
            ("KEN", 109_322_547.12, 1753, 3.55),
            ("Unknown", 203_331_985.30, 2304, 6.60),
        ]
        .into_iter()
        .map(|(code, volume, count, share)| CountryRecord {
            country_code: code.to_string(),
            volume,
            transaction_count: count,
            market_share: share,
        })
        .collect();

        let clients = [
            ("Lemfi", 2_686_506_229.61, 38712, 87.17),
            ("DLocal", 353_927_405.68, 3928, 11.48),
            ("Nala", 23_023_985.63, 286, 0.75),
            ("Wapipay", 18_400_642.19, 99, 0.60),
        ]
        .into_iter()
        .map(|(name, volume, count, share)| ClientRecord {
            client_name: name.to_string(),
            volume,
            transaction_count: count,
            market_share: share,
        })
        .collect();

        let failures = [
            ("Insufficient Balance", 4219, 45.29),
            ("Timed Out", 1286, 13.80),
            ("Invalid Account", 1174, 12.60),
            ("Other", 1193, 12.81),
            ("General Failure", 754, 8.09),
            ("Invalid Details", 430, 4.62),
            ("Invalid Credit Party", 223, 2.39),
        ]
        .into_iter()
        .map(|(reason, count, percentage)| FailureRecord {
            reason: reason.to_string(),
            count,
            percentage,
        })
        .collect();

        Self {
            currency: "KES".to_string(),
            monthly,
            hourly,
            countries,
            clients,
            failures,
        }
    }

    /// Rejects rows that break the model's invariants. Share totals that are
    /// merely off are not errors; see `quality::audit`.
    pub fn validate(&self) -> Result<(), DatasetError> {
        for (set, periods) in [
            (RecordSet::Monthly, &self.monthly),
            (RecordSet::Hourly, &self.hourly),
        ] {
            for period in periods {
                check_volume(set, &period.label, period.volume)?;
                if let Some(rate) = period.success_rate {
                    if !(0.0..=100.0).contains(&rate) {
                        return Err(DatasetError::InvalidRate {
                            set,
                            label: period.label.clone(),
                            rate,
                        });
                    }
                }
            }
        }

        for country in &self.countries {
            check_volume(RecordSet::Countries, &country.country_code, country.volume)?;
        }
        for client in &self.clients {
            check_volume(RecordSet::Clients, &client.client_name, client.volume)?;
        }

        check_unique(
            RecordSet::Countries,
            self.countries.iter().map(|c| c.country_code.as_str()),
        )?;
        check_unique(
            RecordSet::Clients,
            self.clients.iter().map(|c| c.client_name.as_str()),
        )?;
        check_unique(
            RecordSet::Failures,
            self.failures.iter().map(|f| f.reason.as_str()),
        )?;

        Ok(())
    }
}

fn check_volume(set: RecordSet, label: &str, volume: f64) -> Result<(), DatasetError> {
    if volume.is_finite() && volume >= 0.0 {
        return Ok(());
    }
    Err(DatasetError::InvalidVolume {
        set,
        label: label.to_string(),
        volume,
    })
}

fn check_unique<'a>(
    set: RecordSet,
    keys: impl Iterator<Item = &'a str>,
) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(DatasetError::DuplicateKey {
                set,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dataset_is_valid() {
        let dataset = Dataset::builtin();
        assert!(dataset.validate().is_ok());
        assert_eq!(dataset.monthly.len(), 7);
        assert_eq!(dataset.hourly.len(), 24);
        assert_eq!(dataset.countries.len(), 5);
        assert_eq!(dataset.clients.len(), 4);
        assert_eq!(dataset.failures.len(), 7);
    }

    #[test]
    fn negative_volume_is_rejected() {
        let mut dataset = Dataset::builtin();
        dataset.clients[1].volume = -1.0;
        let err = dataset.validate().unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InvalidVolume { set: RecordSet::Clients, ref label, .. } if label == "DLocal"
        ));
    }

    #[test]
    fn non_finite_volume_is_rejected() {
        let mut dataset = Dataset::builtin();
        dataset.hourly[0].volume = f64::NAN;
        assert!(matches!(
            dataset.validate(),
            Err(DatasetError::InvalidVolume {
                set: RecordSet::Hourly,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_country_is_rejected() {
        let mut dataset = Dataset::builtin();
        let copy = dataset.countries[0].clone();
        dataset.countries.push(copy);
        let err = dataset.validate().unwrap_err();
        assert_eq!(err.to_string(), "countries contains duplicate key 'USA'");
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        let mut dataset = Dataset::builtin();
        dataset.monthly[2].success_rate = Some(104.0);
        assert!(matches!(
            dataset.validate(),
            Err(DatasetError::InvalidRate { rate, .. }) if rate == 104.0
        ));
    }
}
