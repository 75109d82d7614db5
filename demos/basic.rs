//! Basic example demonstrating mixed-kmeans-rs usage
//!
//! Run with: cargo run --example basic --release

use mixed_kmeans_rs::{
    render_clusters, DatasetBuilder, KMeansConfig, MemoryModelStore, MixedKMeans, ModelStore,
};

fn main() {
    println!("=== mixed-kmeans-rs example ===\n");

    // The classic play-tennis table: three categorical columns, two numeric
    let header = ["outlook", "temperature", "humidity", "wind", "play"];
    let records = [
        ["sunny", "85", "85", "weak", "no"],
        ["sunny", "80", "90", "strong", "no"],
        ["overcast", "83", "86", "weak", "yes"],
        ["rain", "70", "96", "weak", "yes"],
        ["rain", "68", "80", "weak", "yes"],
        ["rain", "65", "70", "strong", "no"],
        ["overcast", "64", "65", "strong", "yes"],
        ["sunny", "72", "95", "weak", "no"],
        ["sunny", "69", "70", "weak", "yes"],
        ["rain", "75", "80", "weak", "yes"],
        ["sunny", "75", "70", "strong", "yes"],
        ["overcast", "72", "90", "strong", "yes"],
        ["overcast", "81", "75", "weak", "yes"],
        ["rain", "71", "91", "strong", "no"],
    ];

    let mut builder = DatasetBuilder::new(header);
    for record in records {
        builder.push_record(record).expect("record width matches header");
    }
    let data = builder.build().expect("Building dataset failed");

    println!("Input table:\n{}", data);
    for attribute in data.attributes().iter() {
        let kind = if attribute.is_continuous() {
            "continuous"
        } else {
            "categorical"
        };
        println!("  {:<12} {}", attribute.name(), kind);
    }
    println!();

    let n_clusters = 3;
    let config = KMeansConfig::new(n_clusters).with_seed(42).with_verbose(true);

    println!("Running k-means with k={}...\n", n_clusters);

    let mut kmeans = MixedKMeans::with_config(config);
    let passes = kmeans.fit(&data).expect("Training failed");
    let clusters = kmeans.cluster_set().expect("model is fitted");

    println!("Number of passes: {}\n", passes);
    print!("{}", render_clusters(clusters, &data));

    // Count rows per cluster
    let labels = kmeans.predict(&data).expect("Prediction failed");
    let mut cluster_counts = vec![0usize; n_clusters];
    for &label in labels.iter() {
        cluster_counts[label] += 1;
    }

    println!("Cluster distribution:");
    for (i, count) in cluster_counts.iter().enumerate() {
        println!(
            "  Cluster {}: {} rows ({:.1}%)",
            i,
            count,
            (*count as f64 / data.row_count() as f64) * 100.0
        );
    }
    println!();

    // Persist and reload under the table/k key
    let mut store = MemoryModelStore::new();
    let key = format!("MapDBplaytennis{}", n_clusters);
    store.save(clusters, &key).expect("Saving failed");
    let reloaded = store.load(&key).expect("Loading failed");

    println!("Reloaded model '{}':\n{}", key, reloaded);

    println!("=== Done! ===");
}
