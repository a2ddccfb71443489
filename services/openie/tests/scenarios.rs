use openie::graph::{parse_conllu, ParsedSentence};
use openie::search::{BudgetLimit, SearchBudget};
use openie::triples::RelationTriple;
use openie::{ExtractionParams, Extractor, Resources};

const SOME_BLUE_CATS: &str = "\
# sent_id = blue-cats
1\tsome\tsome\tDET\tDT\t_\t3\tdet\t_\t_
2\tblue\tblue\tADJ\tJJ\t_\t3\tamod\t_\t_
3\tcats\tcat\tNOUN\tNNS\t_\t4\tnsubj\t_\t_
4\thave\thave\tVERB\tVBP\t_\t0\troot\t_\t_
5\ttails\ttail\tNOUN\tNNS\t_\t4\tobj\t_\t_
";

const SOME_CATS: &str = "\
# sent_id = cats
1\tsome\tsome\tDET\tDT\t_\t2\tdet\t_\t_
2\tcats\tcat\tNOUN\tNNS\t_\t3\tnsubj\t_\t_
3\thave\thave\tVERB\tVBP\t_\t0\troot\t_\t_
4\ttails\ttail\tNOUN\tNNS\t_\t3\tobj\t_\t_
";

const OBAMA: &str = "\
# sent_id = obama
# text = Barack Hussein Obama II is the 44th and current President of the United States, and the first African American to hold the office.
1\tBarack\tBarack\tPROPN\tNNP\t_\t3\tcompound\t_\t_
2\tHussein\tHussein\tPROPN\tNNP\t_\t3\tcompound\t_\t_
3\tObama\tObama\tPROPN\tNNP\t_\t10\tnsubj\t_\t_
4\tII\tII\tPROPN\tNNP\t_\t3\tflat\t_\t_
5\tis\tbe\tAUX\tVBZ\t_\t10\tcop\t_\t_
6\tthe\tthe\tDET\tDT\t_\t10\tdet\t_\t_
7\t44th\t44th\tADJ\tJJ\t_\t10\tamod\t_\t_
8\tand\tand\tCCONJ\tCC\t_\t9\tcc\t_\t_
9\tcurrent\tcurrent\tADJ\tJJ\t_\t7\tconj\t_\t_
10\tPresident\tPresident\tPROPN\tNNP\t_\t0\troot\t_\t_
11\tof\tof\tADP\tIN\t_\t14\tcase\t_\t_
12\tthe\tthe\tDET\tDT\t_\t14\tdet\t_\t_
13\tUnited\tUnited\tPROPN\tNNP\t_\t14\tcompound\t_\t_
14\tStates\tStates\tPROPN\tNNPS\t_\t10\tnmod\t_\t_
15\t,\t,\tPUNCT\t,\t_\t20\tpunct\t_\t_
16\tand\tand\tCCONJ\tCC\t_\t20\tcc\t_\t_
17\tthe\tthe\tDET\tDT\t_\t20\tdet\t_\t_
18\tfirst\tfirst\tADJ\tJJ\t_\t20\tamod\t_\t_
19\tAfrican\tAfrican\tADJ\tJJ\t_\t20\tamod\t_\t_
20\tAmerican\tAmerican\tPROPN\tNNP\t_\t10\tconj\t_\t_
21\tto\tto\tPART\tTO\t_\t22\tmark\t_\t_
22\thold\thold\tVERB\tVB\t_\t20\tacl\t_\t_
23\tthe\tthe\tDET\tDT\t_\t24\tdet\t_\t_
24\toffice\toffice\tNOUN\tNN\t_\t22\tobj\t_\t_
25\t.\t.\tPUNCT\t.\t_\t10\tpunct\t_\t_
";

const BIG_DOG: &str = "\
1\tthe\tthe\tDET\tDT\t_\t3\tdet\t_\t_
2\tbig\tbig\tADJ\tJJ\t_\t3\tamod\t_\t_
3\tdog\tdog\tNOUN\tNN\t_\t0\troot\t_\t_
";

fn one(conllu: &str) -> ParsedSentence {
    let mut sentences = parse_conllu(conllu).unwrap();
    assert_eq!(sentences.len(), 1);
    sentences.remove(0)
}

fn find<'a>(triples: &'a [RelationTriple], s: &str, r: &str, o: &str) -> Option<&'a RelationTriple> {
    triples
        .iter()
        .find(|t| t.subject == s && t.relation == r && t.object == o)
}

#[test]
fn test_deleting_upward_modifiers_yields_shorter_fragments() {
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(SOME_BLUE_CATS)).unwrap();

    let texts: Vec<&str> = extraction.fragments.iter().map(|f| f.text.as_str()).collect();
    assert!(texts.contains(&"some cats have tails"));
    assert!(texts.contains(&"blue cats have tails"));
    assert!(texts.contains(&"cats have tails"));
    assert_eq!(extraction.sentence_id, "blue-cats");
}

#[test]
fn test_simple_transitive_triple() {
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(SOME_CATS)).unwrap();

    let triple = find(&extraction.triples, "cats", "have", "tails").unwrap();
    assert!(triple.confidence > 0.1);
    assert!(triple.confidence <= 1.0);
}

#[test]
fn test_copular_sentence_with_coordination() {
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(OBAMA)).unwrap();

    assert!(extraction.budget_exceeded.is_none());
    let triples = &extraction.triples;
    assert!(
        find(triples, "Barack Hussein Obama II", "is President of", "United States").is_some(),
        "missing 'is President of' in {:#?}",
        triples
    );
    assert!(
        find(triples, "Barack Hussein Obama II", "is", "President").is_some(),
        "missing 'is President' in {:#?}",
        triples
    );
    assert!(find(triples, "Barack Hussein Obama II", "is", "American").is_some());

    for triple in triples {
        assert!((0.0..=1.0).contains(&triple.confidence));
        assert!(!triple.subject.contains(','));
        assert!(!triple.object.contains(','));
    }
}

#[test]
fn test_noun_phrase_has_no_triples() {
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(BIG_DOG)).unwrap();
    assert!(extraction.triples.is_empty());
    assert!(!extraction.fragments.is_empty());
}

#[test]
fn test_budget_exhaustion_returns_partial_fragments() {
    let resources = Resources::standard().unwrap();
    let params = ExtractionParams {
        budget: SearchBudget {
            max_states: 5,
            ..SearchBudget::default()
        },
        ..ExtractionParams::default()
    };
    let extractor = Extractor::new(&resources, params);
    let sentence = one(OBAMA);
    let extraction = extractor.extract(&sentence).unwrap();

    let exceeded = extraction.budget_exceeded.clone().unwrap();
    assert_eq!(exceeded.limit, BudgetLimit::States);
    assert_eq!(extraction.fragments.len(), 5);
    assert_eq!(extraction.fragments[0].weight, 1.0);
    assert!(extraction.fragments[0].deletions.is_empty());
    assert!(extraction.fragments.iter().all(|f| f.weight > 0.0 && f.weight <= 1.0));
}

#[test]
fn test_overlong_sentence_keeps_original_only() {
    let resources = Resources::standard().unwrap();
    let params = ExtractionParams {
        budget: SearchBudget {
            max_tokens: 10,
            ..SearchBudget::default()
        },
        ..ExtractionParams::default()
    };
    let extractor = Extractor::new(&resources, params);
    let extraction = extractor.extract(&one(OBAMA)).unwrap();

    assert_eq!(extraction.budget_exceeded.map(|e| e.limit), Some(BudgetLimit::Tokens));
    assert_eq!(extraction.fragments.len(), 1);
}

#[test]
fn test_cancellation_stops_search() {
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor
        .extract_while(&one(OBAMA), |expanded| expanded < 3)
        .unwrap();
    assert!(extraction.cancelled);
    assert!(!extraction.fragments.is_empty());
}

#[test]
fn test_negated_sentence_keeps_scope_intact() {
    let conllu = "\
1\tcats\tcat\tNOUN\tNNS\t_\t4\tnsubj\t_\t_
2\tdo\tdo\tAUX\tVBP\t_\t4\taux\t_\t_
3\tnot\tnot\tPART\tRB\t_\t4\tadvmod\t_\t_
4\thave\thave\tVERB\tVB\t_\t0\troot\t_\t_
5\tblue\tblue\tADJ\tJJ\t_\t6\tamod\t_\t_
6\ttails\ttail\tNOUN\tNNS\t_\t4\tobj\t_\t_
";
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(conllu)).unwrap();

    assert_eq!(extraction.fragments.len(), 1);
    assert!(find(&extraction.triples, "cats", "do not have", "blue tails").is_some());
    assert!(find(&extraction.triples, "cats", "have", "blue tails").is_none());
    assert!(find(&extraction.triples, "cats", "do not have", "tails").is_none());
}

#[test]
fn test_object_and_prepositional_argument_from_one_clause() {
    let conllu = "\
1\tHe\the\tPRON\tPRP\t_\t2\tnsubj\t_\t_
2\ttaught\tteach\tVERB\tVBD\t_\t0\troot\t_\t_
3\tconstitutional\tconstitutional\tADJ\tJJ\t_\t4\tamod\t_\t_
4\tlaw\tlaw\tNOUN\tNN\t_\t2\tobj\t_\t_
5\tat\tat\tADP\tIN\t_\t7\tcase\t_\t_
6\tthe\tthe\tDET\tDT\t_\t7\tdet\t_\t_
7\tUniversity\tUniversity\tPROPN\tNNP\t_\t2\tobl\t_\t_
8\tfrom\tfrom\tADP\tIN\t_\t9\tcase\t_\t_
9\t1992\t1992\tNUM\tCD\t_\t2\tobl\t_\t_
10\tto\tto\tADP\tIN\t_\t11\tcase\t_\t_
11\t2004\t2004\tNUM\tCD\t_\t2\tobl\t_\t_
";
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(conllu)).unwrap();
    let triples = &extraction.triples;

    assert!(find(triples, "He", "taught", "constitutional law").is_some());
    assert!(find(triples, "He", "taught", "law").is_some());
    let at = find(triples, "He", "taught at", "the University").unwrap();
    assert!((at.confidence - 0.9).abs() < 1e-9);
    assert!(find(triples, "He", "taught at", "University").is_some());
    assert!(find(triples, "He", "taught to", "2004").is_none());
    assert!(find(triples, "He", "taught from", "1992").is_none());
}

#[test]
fn test_relative_clause_and_passive() {
    // the book that Smith wrote was published in London
    let conllu = "\
1\tthe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tbook\tbook\tNOUN\tNN\t_\t7\tnsubj:pass\t_\t_
3\tthat\tthat\tPRON\tWDT\t_\t5\tobj\t_\t_
4\tSmith\tSmith\tPROPN\tNNP\t_\t5\tnsubj\t_\t_
5\twrote\twrite\tVERB\tVBD\t_\t2\tacl:relcl\t_\t_
6\twas\tbe\tAUX\tVBD\t_\t7\taux:pass\t_\t_
7\tpublished\tpublish\tVERB\tVBN\t_\t0\troot\t_\t_
8\tin\tin\tADP\tIN\t_\t9\tcase\t_\t_
9\tLondon\tLondon\tPROPN\tNNP\t_\t7\tobl\t_\t_
";
    let resources = Resources::standard().unwrap();
    let extractor = Extractor::new(&resources, ExtractionParams::default());
    let extraction = extractor.extract(&one(conllu)).unwrap();

    assert!(find(&extraction.triples, "book", "was published in", "London").is_some());
    assert!(find(&extraction.triples, "Smith", "wrote", "the book").is_some());
}
