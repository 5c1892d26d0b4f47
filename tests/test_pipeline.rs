//! Integration test: Full comparison (load → prepare → split → cross-validate → rank → plot)

use kolosal_compare::cli::run_compare;
use kolosal_compare::prelude::*;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn passengers() -> DataFrame {
    let n = 60;
    let mut pclass = Vec::with_capacity(n);
    let mut sex = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut fare = Vec::with_capacity(n);
    let mut embarked = Vec::with_capacity(n);
    let mut survived = Vec::with_capacity(n);

    for i in 0..n {
        let class = 1 + (i % 3) as i64;
        let female = i % 2 == 1;
        pclass.push(class);
        sex.push(if female { "female" } else { "male" });
        age.push(if i % 7 == 3 { None } else { Some(18.0 + (i % 40) as f64) });
        fare.push(8.0 + (3 - class) as f64 * 25.0 + (i % 5) as f64);
        embarked.push(if i == 11 { None } else { Some(["S", "C", "Q"][i % 3]) });
        survived.push(if female && class < 3 { 1i32 } else if !female && class == 1 && i % 4 == 0 { 1 } else { 0 });
    }

    df!(
        "Pclass" => &pclass,
        "Sex" => &sex,
        "Age" => &age,
        "Fare" => &fare,
        "Embarked" => &embarked,
        "Survived" => &survived
    )
    .unwrap()
}

#[test]
fn test_prepare_and_compare_in_memory() {
    let df = passengers();
    let plan = ColumnPlan::infer(&df, "Survived", &[]).unwrap();
    assert_eq!(plan.numeric, vec!["Pclass", "Age", "Fare"]);
    assert_eq!(plan.categorical, vec!["Sex", "Embarked"]);

    let data = prepare(&df, &plan).unwrap();
    assert_eq!(data.n_samples(), 60);
    assert!(data.feature_names().iter().any(|n| n == "Sex_female"));
    assert!(data.features().iter().all(|v| v.is_finite()));

    let (train, test) = train_test_split(&data, 0.25, true, 42).unwrap();
    assert_eq!(train.n_samples() + test.n_samples(), 60);

    let specs = [
        ModelSpec::Dummy,
        ModelSpec::DecisionTree { max_depth: Some(3) },
    ];
    let mut records: Vec<_> = specs
        .iter()
        .map(|spec| {
            ModelRecord::new(
                spec.build_pipeline(ScalerType::Standard),
                spec.display_name(),
                train.features(),
                train.labels(),
            )
            .unwrap()
        })
        .collect();

    for record in records.iter_mut() {
        let results = record.cross_validate(DataSource::Own, 5).unwrap();
        assert_eq!(results.n_folds(), 5);
    }

    let ranked = rank(&records);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].name, "DecisionTree(depth=3)");

    let table = comparison_table(&records);
    assert!(table.contains("Dummy"));

    let mut surface = SvgSurface::default();
    records[1].plot(&mut surface).unwrap();
    assert!(surface.render().contains("DecisionTree(depth=3) cross-validation accuracy"));
}

/// Duplicates every positive row and records how many rows it saw
#[derive(Clone)]
struct DuplicatePositives {
    seen: Rc<RefCell<Vec<usize>>>,
}

impl Resampler for DuplicatePositives {
    fn fit_resample(&self, x: &Array2<f64>, y: &Array1<f64>) -> kolosal_compare::Result<(Array2<f64>, Array1<f64>)> {
        self.seen.borrow_mut().push(y.len());

        let mut rows: Vec<usize> = (0..y.len()).collect();
        rows.extend((0..y.len()).filter(|&i| y[i] == 1.0));
        let x_res = Array2::from_shape_fn((rows.len(), x.ncols()), |(i, j)| x[[rows[i], j]]);
        let y_res = Array1::from_iter(rows.iter().map(|&i| y[i]));
        Ok((x_res, y_res))
    }
}

#[test]
fn test_resampler_only_sees_training_folds() {
    let df = passengers();
    let plan = ColumnPlan::infer(&df, "Survived", &[]).unwrap();
    let data = prepare(&df, &plan).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let pipeline = Pipeline::new(DecisionTreeClassifier::new().with_max_depth(Some(4)))
        .with_step("scaler", Scaler::new(ScalerType::MinMax))
        .with_resampler("oversample", DuplicatePositives { seen: Rc::clone(&seen) });

    let mut record = ModelRecord::new(pipeline, "Oversampled tree", data.features(), data.labels()).unwrap();
    record.cross_validate(DataSource::Own, 5).unwrap();

    // 60 rows in 5 folds: every fit sees exactly the 48 training rows
    assert_eq!(*seen.borrow(), vec![48; 5]);
}

#[test]
fn test_run_compare_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("passengers.csv");
    let plot_dir = dir.path().join("plots");

    let mut df = passengers();
    let mut file = std::fs::File::create(&data_path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();

    let config = CompareConfig::new(&data_path, "Survived")
        .with_folds(4)
        .with_test_ratio(0.25)
        .with_models(vec![
            ModelSpec::Dummy,
            ModelSpec::DecisionTree { max_depth: Some(3) },
        ])
        .with_plot_dir(&plot_dir);

    let report = run_compare(&config).unwrap();

    assert_eq!(report.n_train + report.n_test, 60);
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|o| o.summary.is_ok()));
    assert_eq!(report.ranking.len(), 2);

    assert_eq!(report.scoring, Scoring::Accuracy);
    let score = report.best_test_score().unwrap();

    let (best, metrics) = report.best.unwrap();
    assert_eq!(best, report.ranking[0].name);
    assert_eq!(metrics.n_samples, report.n_test);
    assert!((score - metrics.accuracy).abs() < 1e-12);

    assert!(plot_dir.join("dummy.svg").exists());
    assert!(plot_dir.join("decisiontree_depth_3.svg").exists());
}

#[test]
fn test_run_compare_missing_target() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("passengers.csv");
    let mut df = passengers();
    let mut file = std::fs::File::create(&data_path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();

    let config = CompareConfig::new(&data_path, "Fate");
    assert!(matches!(run_compare(&config), Err(CompareError::FeatureNotFound(_))));
}
