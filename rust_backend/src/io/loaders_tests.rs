#[cfg(test)]
mod tests {
    use crate::algorithms::erlang::MatchPolicy;
    use crate::config::ErlangSettings;
    use crate::io::loaders::{
        BlockingStatsLoader, CellInventoryLoader, ErlangTableLoader, SourceType,
    };
    use std::io::Write;
    use std::path::Path;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const SNAKE_CASE_CSV: &str = "\
site_id,cell_name,stats_key,bsc,trx_900,trx_1800,bcch,sdcch,pdtch,ccch,avg_traffic_erlangs,hr_traffic_pct,blocking_nom_avg_pct,blocking_exceed_count,trx_per_site
DEL0001,DEL0001A,10011,BSC1,2,2,1,2,0,1,25.0,95.0,2.5,4,12
DEL0001,DEL0001B,10012,BSC1,2,2,1,2,0,1,10.5,40.0,,,12
";

    #[test]
    fn test_source_type_from_path() {
        assert_eq!(
            SourceType::from_path(Path::new("cells.CSV")).unwrap(),
            SourceType::Csv
        );
        assert_eq!(
            SourceType::from_path(Path::new("cells.json")).unwrap(),
            SourceType::Json
        );
        let err = SourceType::from_path(Path::new("cells.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
        assert!(SourceType::from_path(Path::new("cells")).is_err());
    }

    #[test]
    fn test_load_cells_from_csv() {
        let file = temp_file(".csv", SNAKE_CASE_CSV);
        let result = CellInventoryLoader::load_from_file(file.path()).unwrap();

        assert_eq!(result.source_type, SourceType::Csv);
        assert!(result.skipped_rows.is_empty());
        assert_eq!(result.cells.len(), 2);

        let first = &result.cells[0];
        assert_eq!(first.cell_id(), "DEL0001_1");
        assert_eq!(first.stats_key.as_deref(), Some("10011"));
        assert_eq!(first.meta.bsc.as_deref(), Some("BSC1"));
        assert_eq!(first.meta.vendor, None);
        assert_eq!(first.total_tch(), 28);
        assert_eq!(first.blocking_exceed_count, Some(4));
        assert_eq!(first.trx_per_site, 12);

        let second = &result.cells[1];
        assert_eq!(second.avg_traffic_erlangs, 10.5);
        assert_eq!(second.blocking_nom_avg_pct, None);
        assert_eq!(second.blocking_exceed_count, None);
    }

    #[test]
    fn test_load_cells_with_export_headers() {
        let csv = "\
2G_Site_ID,Cellname,MO,OEM,HQ_TOWN,#900 Active TRX,#1800 Active TRX,BCCH,NO OF SDCCH (CAVAACC - NBH) ,PDTCH,CCCH,Traffic(avg 7 days),% HR Traffic(avg 7 days)
GGN0042,GGN0042C,20433,VendorX,Gurgaon,3,1,1,3,1,1,18.2,12.5
";
        let file = temp_file(".csv", csv);
        let result = CellInventoryLoader::load_from_file(file.path()).unwrap();
        assert_eq!(result.cells.len(), 1);

        let cell = &result.cells[0];
        assert_eq!(cell.cell_id(), "GGN0042_3");
        assert_eq!(cell.meta.vendor.as_deref(), Some("VendorX"));
        assert_eq!(cell.meta.town.as_deref(), Some("Gurgaon"));
        assert_eq!(cell.sdcch, 3);
        assert_eq!(cell.total_tch(), 26);
        assert_eq!(cell.hr_traffic_pct, 12.5);
        // No site column: filled in by site aggregation later
        assert_eq!(cell.trx_per_site, 0);
    }

    #[test]
    fn test_rows_with_bad_counts_are_skipped() {
        let csv = "\
site_id,cell_name,trx_900,trx_1800,bcch,sdcch,pdtch,ccch,avg_traffic_erlangs,hr_traffic_pct
S1,S1A,2,-1,1,2,0,1,5.0,10.0
S1,S1B,2,1.5,1,2,0,1,5.0,10.0
S1,S1C,2,2,1,2,0,1,5.0,10.0
,S2A,2,2,1,2,0,1,5.0,10.0
";
        let file = temp_file(".csv", csv);
        let result = CellInventoryLoader::load_from_file(file.path()).unwrap();
        assert_eq!(result.cells.len(), 1);
        assert_eq!(result.cells[0].cell_name, "S1C");
        assert_eq!(result.skipped_rows.len(), 3);
        assert!(result.skipped_rows[0].contains("trx_1800"));
        assert!(result.skipped_rows[2].contains("missing site id"));
    }

    #[test]
    fn test_missing_traffic_becomes_nan() {
        let csv = "\
site_id,cell_name,trx_900,trx_1800,bcch,sdcch,pdtch,ccch,avg_traffic_erlangs,hr_traffic_pct
S1,S1A,2,2,1,2,0,1,,10.0
";
        let file = temp_file(".csv", csv);
        let result = CellInventoryLoader::load_from_file(file.path()).unwrap();
        assert_eq!(result.cells.len(), 1);
        assert!(result.cells[0].avg_traffic_erlangs.is_nan());
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "site_id,cell_name,trx_900\nS1,S1A,2\n";
        let file = temp_file(".csv", csv);
        let err = CellInventoryLoader::load_from_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("trx_1800"));
    }

    #[test]
    fn test_load_cells_from_json_str() {
        let json = r#"[{
            "site_id": "S1",
            "cell_name": "S1A",
            "trx_900": 4,
            "trx_1800": 0,
            "bcch": 1,
            "sdcch": 2,
            "pdtch": 0,
            "ccch": 1,
            "avg_traffic_erlangs": 25.0,
            "hr_traffic_pct": 95.0,
            "blocking_exceed_count": 0,
            "trx_per_site": 12
        }]"#;
        let result = CellInventoryLoader::load_from_json_str(json).unwrap();
        assert_eq!(result.source_type, SourceType::Json);
        assert_eq!(result.cells.len(), 1);
        assert_eq!(result.cells[0].blocking_exceed_count, Some(0));

        assert!(CellInventoryLoader::load_from_json_str("{not json").is_err());
    }

    #[test]
    fn test_load_erlang_table_csv() {
        let csv = "channels,capacity_erlangs\n30,21.93\n28,20.15\n29,\n";
        let file = temp_file(".csv", csv);
        let table = ErlangTableLoader::load_from_file(file.path(), &ErlangSettings::default())
            .unwrap();
        // Blank capacity rows are ignored
        assert_eq!(table.len(), 2);
        assert_eq!(table.policy(), MatchPolicy::Exact);
        assert_eq!(table.lookup(28).unwrap(), 20.15);
        assert!(table.lookup(29).is_err());
    }

    #[test]
    fn test_load_erlang_table_custom_column_and_policy() {
        let csv = "N,0.01,0.02\n28,18.64,20.15\n30,20.34,21.93\n";
        let file = temp_file(".csv", csv);
        let settings = ErlangSettings {
            match_policy: MatchPolicy::RoundDown,
            channels_column: "N".to_string(),
            capacity_column: "0.02".to_string(),
        };
        let table = ErlangTableLoader::load_from_file(file.path(), &settings).unwrap();
        assert_eq!(table.lookup(29).unwrap(), 20.15);
        assert_eq!(table.lookup(30).unwrap(), 21.93);
    }

    #[test]
    fn test_erlang_table_rejects_invalid_rows() {
        let decreasing = temp_file(".csv", "channels,capacity_erlangs\n28,20.0\n30,19.0\n");
        assert!(
            ErlangTableLoader::load_from_file(decreasing.path(), &ErlangSettings::default())
                .is_err()
        );

        let fractional = temp_file(".csv", "channels,capacity_erlangs\n28.5,20.0\n");
        assert!(
            ErlangTableLoader::load_from_file(fractional.path(), &ErlangSettings::default())
                .is_err()
        );

        let empty = temp_file(".csv", "channels,capacity_erlangs\n");
        assert!(
            ErlangTableLoader::load_from_file(empty.path(), &ErlangSettings::default()).is_err()
        );
    }

    #[test]
    fn test_load_erlang_table_json() {
        let json = r#"[
            {"channels": 28, "capacity_erlangs": 20.15},
            {"channels": 29, "capacity_erlangs": 21.04}
        ]"#;
        let file = temp_file(".json", json);
        let table = ErlangTableLoader::load_from_file(file.path(), &ErlangSettings::default())
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(29).unwrap(), 21.04);
    }

    #[test]
    fn test_load_blocking_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("day_02.csv"),
            "CELL_ID,TCH_Blocking_Nom,TCH_Blocking_User_Perceived\n10011,3.0,2.5\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("day_01.csv"),
            "CELL_ID,TCH_Blocking_Nom,TCH_Blocking_User_Perceived\n10011,1.0,0.5\n10012,,4.0\n,2.0,2.0\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let samples = BlockingStatsLoader::load_dir(dir.path()).unwrap();
        assert_eq!(samples.len(), 3);
        // File-name order, then row order
        assert_eq!(samples[0].cell_key, "10011");
        assert_eq!(samples[0].tch_blocking_nom, Some(1.0));
        assert_eq!(samples[1].cell_key, "10012");
        assert_eq!(samples[1].tch_blocking_nom, None);
        assert_eq!(samples[2].tch_blocking_user_perceived, Some(2.5));
    }

    #[test]
    fn test_blocking_file_without_key_column() {
        let file = temp_file(".csv", "cell,TCH_Blocking_Nom\n1,2.0\n");
        assert!(BlockingStatsLoader::load_file(file.path()).is_err());
    }
}
