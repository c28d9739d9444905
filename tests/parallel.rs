#![cfg(feature = "parallel")]
use treecut::{MergeTree, TreeMapper, TreemapParams};

fn seven_point_linkage() -> Vec<(usize, usize, f64, usize)> {
    vec![
        (0, 1, 1.0, 2),
        (5, 6, 1.0, 2),
        (4, 8, 1.0, 3),
        (2, 3, 9.0, 2),
        (9, 10, 89.0, 5),
        (7, 11, 899.0, 7),
    ]
}

#[test]
fn parallel_build_matches_serial() {
    let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
    let mapper = TreeMapper::default_params(&tree);
    assert_eq!(mapper.build().unwrap(), mapper.build_par().unwrap());
}

#[test]
fn parallel_build_matches_serial_at_depth() {
    let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
    let params = TreemapParams::builder().depth(5).splits(2).build();
    let mapper = TreeMapper::new(&tree, params);
    assert_eq!(mapper.build().unwrap(), mapper.build_par().unwrap());
}
