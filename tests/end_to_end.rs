use mhgt::{
    cli::{GenotypeArgs, PanelArgs},
    commands::{genotype::genotype, panel::panel},
};
use std::{fs, path::Path};

const MARKERS: &str = "\
##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
chr1\t103\tsnp1\tA\tG\t.\tPASS\t.
chr1\t105\tmh1\tA-T-G\tG-C-G\t.\tPASS\tOFFSET=3,7
chrX\t50\tsnp2\tC\tT\t.\tPASS\t.
";

fn write_sam(path: &Path) {
    let mut sam = String::from(
        "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:1000\n@RG\tID:rg1\tSM:NA0001\n",
    );
    for i in 0..6 {
        sam.push_str(&format!(
            "a{}\t0\tchr1\t100\t60\t15M\t*\t0\t0\tCCCACACCTCCCGCC\t*\tRG:Z:rg1\n",
            i
        ));
    }
    for i in 0..4 {
        sam.push_str(&format!(
            "b{}\t0\tchr1\t100\t60\t15M\t*\t0\t0\tCCCGCGCCCCCCGCC\t*\tRG:Z:rg1\n",
            i
        ));
    }
    fs::write(path, sam).unwrap();
}

#[test]
fn genotype_then_panel() {
    let dir = tempfile::tempdir().unwrap();
    let markers_path = dir.path().join("markers.vcf");
    let reads_path = dir.path().join("reads.sam");
    fs::write(&markers_path, MARKERS).unwrap();
    write_sam(&reads_path);

    let prefix = dir.path().join("NA0001");
    genotype(GenotypeArgs {
        markers_path: markers_path.clone(),
        reads_path,
        output_prefix: prefix.to_str().unwrap().to_string(),
        min_freq: 0.03,
        num_threads: 2,
        sample_name: None,
        min_mapq: 0,
        max_mismatches: None,
    })
    .unwrap();

    let genotypes = fs::read_to_string(dir.path().join("NA0001.tab")).unwrap();
    assert_eq!(
        genotypes,
        "##sample=NA0001\n#MARKER\tALLELE1\tALLELE2\n\
         snp1\tA\tG\n\
         mh1\tA-T-G\tG-C-G\n\
         snp2\t.\t.\n"
    );

    let depths = fs::read_to_string(dir.path().join("NA0001.depth.tab")).unwrap();
    assert_eq!(
        depths,
        "chr1\t103\tsnp1\t6\t0\t0\t4\tHET\n\
         chr1\t105\tmh1\tA-T-G:6 G-C-G:4\t.\tHET\n\
         chrX\t50\tsnp2\t0\t0\t0\t0\tNO_CANDIDATES\n"
    );

    let second_table = dir.path().join("NA0002.tab");
    fs::write(&second_table, "snp1\tA\tA\nmh1\tA-T-G\tA-T-G\n").unwrap();

    let panel_prefix = dir.path().join("cohort");
    panel(PanelArgs {
        markers_path,
        genotype_paths: vec![dir.path().join("NA0001.tab"), second_table],
        output_prefix: panel_prefix.to_str().unwrap().to_string(),
    })
    .unwrap();

    let matrix = fs::read_to_string(dir.path().join("cohort.panel.tab")).unwrap();
    assert_eq!(
        matrix,
        "SAMPLE\tsnp1\tsnp1\tmh1\tmh1\tsnp2\tsnp2\n\
         NA0001\tA\tG\tA-T-G\tG-C-G\t.\t.\n\
         NA0002\tA\tA\tA-T-G\tA-T-G\t.\t.\n"
    );

    let stats = fs::read_to_string(dir.path().join("cohort.stats.tab")).unwrap();
    assert_eq!(
        stats,
        "#MARKER\tSAMPLES\tAE\tPIC\n\
         snp1\t2\t2\t0.3047\n\
         mh1\t2\t2\t0.3047\n\
         snp2\t2\t0\t0.0000\n"
    );
}
